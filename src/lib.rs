//! A streaming Brainfuck interpreter.
//!
//! Programs are read one byte at a time from a seekable [`ProgramSource`] and
//! never compiled: loops are taken by seeking back to a bookmarked `[`. The
//! tape starts at 1000 zeroed cells and doubles as the pointer moves right.
//!
//! ```
//! use rewind_bf::{BrainfuckReader, ExecutionError, SliceSource};
//!
//! let mut out = Vec::new();
//! let mut bf = BrainfuckReader::new(&b"hi"[..], &mut out);
//! bf.run(SliceSource::from(",.>,.")).unwrap();
//! drop(bf);
//! assert_eq!(out, b"hi");
//!
//! let mut bf = BrainfuckReader::new(std::io::empty(), std::io::sink());
//! let err = bf.run(SliceSource::from("<")).unwrap_err();
//! assert!(matches!(err, ExecutionError::LeftBound { ip: 0 }));
//! ```

pub mod cli_util;
pub mod config;
pub mod error;
pub mod jump_stack;
pub mod logging;
pub mod reader;
pub mod repl;
pub mod source;
pub mod tape;
pub mod theme;

pub use config::{DEBUG_COMMAND, InterpreterConfig};
pub use error::{ExecutionError, Storage, UnmatchedBracketKind};
pub use jump_stack::JumpStack;
pub use reader::BrainfuckReader;
pub use source::{Bookmark, ProgramSource, SliceSource, StreamSource};
pub use tape::Tape;

/// Keep only characters the interpreter acts on, optionally including the debug command.
pub fn bf_only(s: &str, debug: bool) -> String {
    s.chars()
        .filter(|&c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']') || (debug && c == DEBUG_COMMAND as char))
        .collect()
}
