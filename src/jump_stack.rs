//! Bookmarks of the `[` commands that are still open.
//!
//! Each entry is the source position just after a `[`. The stack depth is the
//! current bracket nesting depth. The skip marker records the depth of the
//! `[` whose loop body is being skipped; it is an index, never a reference,
//! so growing the storage cannot invalidate it.

use tracing::trace;

use crate::source::Bookmark;

/// Entries the stack has room for before its first growth.
pub const DEFAULT_STACK_DEPTH: usize = 100;

/// Errors raised by jump stack operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// The stack could not grow to `requested` entries.
    #[error("could not grow jump stack to {requested} entries")]
    Alloc { requested: usize },
    /// Pop on an empty stack; a `]` has no matching `[`.
    #[error("jump stack is empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct JumpStack {
    entries: Vec<Bookmark>,
    skip: Option<usize>,
}

impl JumpStack {
    pub fn new(initial_depth: usize) -> Result<Self, StackError> {
        let initial_depth = initial_depth.max(1);
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(initial_depth)
            .map_err(|_| StackError::Alloc { requested: initial_depth })?;
        Ok(Self { entries, skip: None })
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bookmark of the innermost open `[`.
    pub fn top(&self) -> Option<Bookmark> {
        self.entries.last().copied()
    }

    /// Push a bookmark, doubling storage when full. On failure nothing changes.
    pub fn push(&mut self, bookmark: Bookmark) -> Result<(), StackError> {
        let len = self.entries.len();
        if len == self.entries.capacity() {
            let additional = len.max(1);
            self.entries
                .try_reserve_exact(additional)
                .map_err(|_| StackError::Alloc { requested: len + additional })?;
            trace!(from = len, to = self.entries.capacity(), "jump stack grown");
        }
        self.entries.push(bookmark);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Bookmark, StackError> {
        self.entries.pop().ok_or(StackError::Empty)
    }

    /// Whether a loop body is being skipped.
    pub fn is_skipping(&self) -> bool {
        self.skip.is_some()
    }

    /// Start skipping until the `]` matching the top entry.
    ///
    /// A marker that is already set is kept; nested `[` inside a skipped body
    /// must not move it.
    pub fn begin_skip(&mut self) {
        if self.skip.is_none() && !self.entries.is_empty() {
            self.skip = Some(self.entries.len() - 1);
        }
    }

    /// Clear the skip marker if it refers to the top entry, i.e. the `]` being
    /// processed closes the skipped loop.
    pub fn end_skip_at_top(&mut self) {
        if self.skip.is_some() && self.skip == self.entries.len().checked_sub(1) {
            self.skip = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bm(offset: u64) -> Bookmark {
        Bookmark::new(offset)
    }

    #[test]
    fn pop_on_empty_is_error() {
        let mut s = JumpStack::new(DEFAULT_STACK_DEPTH).unwrap();
        assert_eq!(s.pop(), Err(StackError::Empty));
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut s = JumpStack::new(DEFAULT_STACK_DEPTH).unwrap();
        s.push(bm(1)).unwrap();
        s.push(bm(5)).unwrap();
        assert_eq!(s.depth(), 2);
        assert_eq!(s.pop(), Ok(bm(5)));
        assert_eq!(s.pop(), Ok(bm(1)));
        assert!(s.is_empty());
    }

    #[test]
    fn grows_past_initial_depth() {
        let mut s = JumpStack::new(2).unwrap();
        for i in 0..9 {
            s.push(bm(i)).unwrap();
        }
        assert_eq!(s.depth(), 9);
        assert_eq!(s.top(), Some(bm(8)));
    }

    #[test]
    fn skip_marker_survives_growth() {
        let mut s = JumpStack::new(1).unwrap();
        s.push(bm(1)).unwrap();
        s.begin_skip();
        for i in 2..20 {
            s.push(bm(i)).unwrap();
            s.begin_skip();
        }
        assert!(s.is_skipping());
        for _ in 2..20 {
            s.end_skip_at_top();
            assert!(s.is_skipping());
            s.pop().unwrap();
        }
        s.end_skip_at_top();
        assert!(!s.is_skipping());
        assert_eq!(s.pop(), Ok(bm(1)));
    }

    #[test]
    fn nested_begin_skip_keeps_outer_marker() {
        let mut s = JumpStack::new(DEFAULT_STACK_DEPTH).unwrap();
        s.push(bm(1)).unwrap();
        s.begin_skip();
        s.push(bm(2)).unwrap();
        s.begin_skip();
        s.end_skip_at_top();
        assert!(s.is_skipping(), "inner ] must not end the outer skip");
        s.pop().unwrap();
        s.end_skip_at_top();
        assert!(!s.is_skipping());
    }
}
