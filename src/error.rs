use std::fmt;

/// Errors that end a run of the interpreter.
///
/// A successful run is `Ok(())`; each variant here is a fatal status. The loop
/// halts on the first one it meets and never continues past it.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Growing the tape or the jump stack could not be satisfied.
    #[error("failed to allocate memory while growing the {storage} to {requested} entries")]
    Alloc { storage: Storage, requested: usize },

    /// The data pointer attempted to move left of cell 0.
    #[error("the program went past the start of the tape at instruction {ip}")]
    LeftBound { ip: usize },

    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("improperly nested jumps: unmatched {kind} at instruction {ip}")]
    UnmatchedBrackets { ip: usize, kind: UnmatchedBracketKind },

    /// Reading the program, reading input or writing output failed on the host side.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutionError {
    /// Offset in the program source of the instruction that failed, when known.
    pub fn ip(&self) -> Option<usize> {
        match self {
            ExecutionError::Alloc { .. } => None,
            ExecutionError::LeftBound { ip }
            | ExecutionError::UnmatchedBrackets { ip, .. }
            | ExecutionError::Io { ip, .. } => Some(*ip),
        }
    }
}

/// Which growable storage failed to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Tape,
    JumpStack,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Tape => write!(f, "tape"),
            Storage::JumpStack => write!(f, "jump stack"),
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}
