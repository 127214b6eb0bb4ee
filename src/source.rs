//! Program sources the interpreter reads from.
//!
//! The interpreter has no instruction index. It reads one byte at a time and
//! jumps back by seeking to a [`Bookmark`] taken earlier from the same source,
//! so any source must support read-next, current position and seek-back.

use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};

/// A position in a program source, as a byte offset from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bookmark(u64);

impl Bookmark {
    pub fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub fn offset(self) -> u64 {
        self.0
    }
}

/// A program the interpreter can read forwards and rewind.
pub trait ProgramSource {
    /// Next byte of the program, or `None` at end of stream.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;

    /// Position of the byte the next call to [`ProgramSource::next_byte`] returns.
    fn position(&self) -> Bookmark;

    /// Return to a position previously obtained from [`ProgramSource::position`].
    fn seek(&mut self, bookmark: Bookmark) -> io::Result<()>;
}

impl<S: ProgramSource + ?Sized> ProgramSource for &mut S {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }

    fn position(&self) -> Bookmark {
        (**self).position()
    }

    fn seek(&mut self, bookmark: Bookmark) -> io::Result<()> {
        (**self).seek(bookmark)
    }
}

/// An in-memory program; positions are plain indices.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pos: 0 }
    }
}

impl<'a> From<&'a str> for SliceSource<'a> {
    fn from(code: &'a str) -> Self {
        Self::new(code.as_bytes())
    }
}

impl ProgramSource for SliceSource<'_> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.code.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    fn position(&self) -> Bookmark {
        Bookmark(self.pos as u64)
    }

    fn seek(&mut self, bookmark: Bookmark) -> io::Result<()> {
        let pos = usize::try_from(bookmark.0)
            .ok()
            .filter(|&p| p <= self.code.len())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "bookmark outside program"))?;
        self.pos = pos;
        Ok(())
    }
}

/// A buffered program read from any seekable stream, such as a file.
///
/// Offsets are tracked here rather than queried from the stream, and rewinds
/// use relative seeks so a jump that lands inside the current buffer does not
/// touch the underlying stream.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: BufReader<R>,
    pos: u64,
}

impl<R: Read + Seek> StreamSource<R> {
    /// Wrap `inner`, starting from its current position.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        Ok(Self { inner: BufReader::new(inner), pos })
    }
}

impl<R: Read + Seek> ProgramSource for StreamSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.pos += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn position(&self) -> Bookmark {
        Bookmark(self.pos)
    }

    fn seek(&mut self, bookmark: Bookmark) -> io::Result<()> {
        let delta = i64::try_from(bookmark.0 as i128 - self.pos as i128)
            .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "bookmark too far away"))?;
        match self.inner.seek_relative(delta) {
            Ok(()) => {}
            Err(_) => {
                self.inner.seek(SeekFrom::Start(bookmark.0))?;
            }
        }
        self.pos = bookmark.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(src: &mut impl ProgramSource) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(b) = src.next_byte().unwrap() {
            out.push(b);
        }
        out
    }

    #[test]
    fn slice_source_rewinds_to_bookmark() {
        let mut src = SliceSource::from("+[-]");
        src.next_byte().unwrap();
        src.next_byte().unwrap();
        let mark = src.position();
        assert_eq!(mark, Bookmark::new(2));
        assert_eq!(drain(&mut src), b"-]");
        src.seek(mark).unwrap();
        assert_eq!(drain(&mut src), b"-]");
    }

    #[test]
    fn slice_source_rejects_bookmark_past_end() {
        let mut src = SliceSource::from("+");
        assert!(src.seek(Bookmark::new(9)).is_err());
    }

    #[test]
    fn stream_source_rewinds_to_bookmark() {
        let mut src = StreamSource::new(Cursor::new(b"ab[cd]".to_vec())).unwrap();
        for _ in 0..3 {
            src.next_byte().unwrap();
        }
        let mark = src.position();
        assert_eq!(drain(&mut src), b"cd]");
        src.seek(mark).unwrap();
        assert_eq!(src.position(), mark);
        assert_eq!(drain(&mut src), b"cd]");
    }

    #[test]
    fn stream_source_starts_at_stream_position() {
        let mut cursor = Cursor::new(b"xx+".to_vec());
        cursor.set_position(2);
        let mut src = StreamSource::new(cursor).unwrap();
        assert_eq!(src.position(), Bookmark::new(2));
        assert_eq!(src.next_byte().unwrap(), Some(b'+'));
        assert_eq!(src.next_byte().unwrap(), None);
    }
}
