//! Text selection handling.
//!
//! ## Range Types
//!
//! Selections use exclusive ranges (`start..end`) because:
//! - Empty selections (start == end) are natural
//! - Easier arithmetic (length = end - start)
//! - Consistent with slice semantics

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A directed selection in character offsets.
///
/// The anchor is where the selection started, the head is where the caret
/// sits. Either may come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    /// Where the caret is
    pub head: usize,
}

impl Selection {
    /// Creates a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Creates a zero-width selection (caret only).
    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    /// Creates a forward selection covering `range`, caret at `range.end`.
    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Returns the lower bound.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Returns the upper bound.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Returns the normalized range.
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Returns true if the selection runs backwards (caret before anchor).
    pub fn is_backward(&self) -> bool {
        self.head < self.anchor
    }

    /// Clamps both ends to `len`.
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::from_range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalization() {
        let sel = Selection::new(10, 3);
        assert_eq!(sel.range(), 3..10);
        assert!(sel.is_backward());
        assert_eq!(sel.head, 3);
    }

    #[test]
    fn test_from_range_puts_caret_at_end() {
        let sel = Selection::from(4..9);
        assert_eq!(sel.head, 9);
        assert!(!sel.is_backward());
    }

    #[test]
    fn test_clamp() {
        let sel = Selection::new(2, 20).clamp(5);
        assert_eq!(sel.range(), 2..5);
        assert!(Selection::caret(7).clamp(3).is_empty());
    }
}
