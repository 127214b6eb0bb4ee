//! The memory tape a Brainfuck program manipulates.
//!
//! The tape starts with a fixed number of zeroed cells and doubles whenever
//! the data pointer would step past the last allocated cell. The pointer is a
//! plain index, so it stays valid across reallocation. Moving left of cell 0
//! is an error; there is no wrap-around.

use std::io::{self, ErrorKind, Read, Write};

use tracing::trace;

/// Cells the tape starts with when no configuration says otherwise.
pub const DEFAULT_TAPE_CELLS: usize = 1000;

/// What a cell is set to when `,` meets end of input.
pub const CELL_VALUE_EOF: u8 = 0;

/// Errors raised by tape operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TapeError {
    /// The tape could not grow to `requested` cells.
    #[error("could not grow tape to {requested} cells")]
    Alloc { requested: usize },
    /// The pointer is already at cell 0.
    #[error("pointer is at the start of the tape")]
    LeftBound,
}

/// A growable run of byte cells plus the index of the current cell.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    max_cells: Option<usize>,
}

impl Tape {
    /// Allocate a zeroed tape of `initial_cells` cells (at least one).
    ///
    /// `max_cells` caps growth: a doubling that cannot fit under the cap is
    /// reported the same way as a failed allocation. An initial size above the
    /// cap is cut down to it.
    pub fn new(initial_cells: usize, max_cells: Option<usize>) -> Result<Self, TapeError> {
        let initial_cells = initial_cells.min(max_cells.unwrap_or(usize::MAX)).max(1);

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(initial_cells)
            .map_err(|_| TapeError::Alloc { requested: initial_cells })?;
        cells.resize(initial_cells, 0);

        Ok(Self { cells, pointer: 0, max_cells })
    }

    /// Index of the current cell.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Number of allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of the current cell.
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    /// Value at `index` without allocating; cells past the end read as zero.
    pub fn peek(&self, index: usize) -> u8 {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// Move the pointer one cell right, doubling the tape if it is at the last cell.
    ///
    /// On failure the tape and the pointer are left untouched.
    pub fn move_right(&mut self) -> Result<(), TapeError> {
        if self.pointer + 1 == self.cells.len() {
            self.grow()?;
        }
        self.pointer += 1;
        Ok(())
    }

    /// Move the pointer one cell left.
    pub fn move_left(&mut self) -> Result<(), TapeError> {
        if self.pointer == 0 {
            return Err(TapeError::LeftBound);
        }
        self.pointer -= 1;
        Ok(())
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    /// Write the raw byte of the current cell to `sink`.
    pub fn output<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(&[self.current()])
    }

    /// Read one byte from `source` into the current cell; end of input stores [`CELL_VALUE_EOF`].
    pub fn input<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<()> {
        let mut buf = [0u8; 1];
        let value = loop {
            match source.read(&mut buf) {
                Ok(0) => break CELL_VALUE_EOF,
                Ok(_) => break buf[0],
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        self.cells[self.pointer] = value;
        Ok(())
    }

    fn grow(&mut self) -> Result<(), TapeError> {
        let len = self.cells.len();
        let mut requested = len.checked_mul(2).ok_or(TapeError::Alloc { requested: usize::MAX })?;
        if let Some(max) = self.max_cells {
            requested = requested.min(max);
        }
        if requested <= len {
            return Err(TapeError::Alloc { requested: len + 1 });
        }

        self.cells
            .try_reserve_exact(requested - len)
            .map_err(|_| TapeError::Alloc { requested })?;
        self.cells.resize(requested, 0);
        trace!(from = len, to = requested, "tape grown");
        Ok(())
    }
}
