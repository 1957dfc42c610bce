//! # Ted Buffer
//!
//! Rope-backed text buffer used by every open document.
//!
//! ## Key Concepts
//!
//! ### Character addressing
//! - All offsets are character (Unicode scalar) indices, never bytes
//! - Ranges are half-open: `start..end`
//!
//! ### Ownership
//! - `TextBuffer` owns its rope, its selection and its undo history
//! - Mutations require `&mut self`, so a buffer has exactly one writer
//!
//! ### Undo groups
//! - A replacement is recorded as one undo step
//! - Callers may wrap many edits in `begin_undo_group` / `end_undo_group`
//!   so they undo together

mod buffer;
mod history;
mod position;
mod selection;

pub use buffer::{BufferConfig, TextBuffer};
pub use history::{Edit, EditGroup, EditKind, History};
pub use position::Position;
pub use selection::Selection;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range: {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_chars(), 13);
        assert_eq!(buffer.text(), "Hello, World!");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        assert_eq!(buffer.text(), "Hello");

        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        buffer.delete(5..7).unwrap();
        assert_eq!(buffer.text(), "HelloWorld!");
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_replace_is_one_undo_step() {
        let mut buffer = TextBuffer::from("foo bar");
        let inserted = buffer.replace(0..3, "baz").unwrap();
        assert_eq!(inserted, 0..3);
        assert_eq!(buffer.text(), "baz bar");

        buffer.undo().unwrap();
        assert_eq!(buffer.text(), "foo bar");

        buffer.redo().unwrap();
        assert_eq!(buffer.text(), "baz bar");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.char_idx_to_position(7).unwrap(), Position::new(1, 0));
        assert_eq!(buffer.char_idx_to_position(20).unwrap(), Position::new(2, 6));
    }
}
