//! The buffer seam between documents and whatever stores their text.
//!
//! Documents and the search engine only ever see a `TextHandle`. The
//! workspace's own [`TextBuffer`] implements it; a GUI front end can wrap
//! its widget instead.

use std::ops::Range;
use std::path::Path;

use ted_buffer::{BufferResult, Position, Selection, TextBuffer};

/// Range-addressed access to one document's text and selection.
///
/// All offsets are character indices.
pub trait TextHandle {
    /// Number of characters in the buffer.
    fn len_chars(&self) -> usize;

    /// The whole content.
    fn text(&self) -> String;

    /// Content of `range`, or `None` if it is out of bounds.
    fn text_range(&self, range: Range<usize>) -> Option<String>;

    /// Current selection; its head is the caret.
    fn selection(&self) -> Selection;

    /// Moves the selection.
    fn set_selection(&mut self, selection: Selection);

    /// Replaces `range` with `text`, returning the range now covered by `text`.
    fn replace_range(&mut self, range: Range<usize>, text: &str) -> BufferResult<Range<usize>>;

    /// Starts a group of edits that undo as one step.
    fn begin_undo_group(&mut self);

    /// Ends the group started by `begin_undo_group`.
    fn end_undo_group(&mut self);

    fn undo(&mut self) -> BufferResult<()>;

    fn redo(&mut self) -> BufferResult<()>;

    /// Replaces the content with the file at `path` and marks it clean.
    fn load(&mut self, path: &Path) -> BufferResult<()>;

    /// Writes the content to `path` and marks it clean.
    fn save(&mut self, path: &Path) -> BufferResult<()>;

    /// True if edited since the last load/save.
    fn is_modified(&self) -> bool;

    /// Caret as line/column for status reporting.
    fn caret_position(&self) -> Position;

    /// Caret offset.
    fn caret(&self) -> usize {
        self.selection().head
    }
}

impl TextHandle for TextBuffer {
    fn len_chars(&self) -> usize {
        TextBuffer::len_chars(self)
    }

    fn text(&self) -> String {
        TextBuffer::text(self).into_owned()
    }

    fn text_range(&self, range: Range<usize>) -> Option<String> {
        self.slice(range).ok().map(|s| s.into_owned())
    }

    fn selection(&self) -> Selection {
        TextBuffer::selection(self)
    }

    fn set_selection(&mut self, selection: Selection) {
        TextBuffer::set_selection(self, selection);
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) -> BufferResult<Range<usize>> {
        self.replace(range, text)
    }

    fn begin_undo_group(&mut self) {
        TextBuffer::begin_undo_group(self);
    }

    fn end_undo_group(&mut self) {
        TextBuffer::end_undo_group(self);
    }

    fn undo(&mut self) -> BufferResult<()> {
        TextBuffer::undo(self)
    }

    fn redo(&mut self) -> BufferResult<()> {
        TextBuffer::redo(self)
    }

    fn load(&mut self, path: &Path) -> BufferResult<()> {
        TextBuffer::load(self, path)
    }

    fn save(&mut self, path: &Path) -> BufferResult<()> {
        self.save_as(path)
    }

    fn is_modified(&self) -> bool {
        TextBuffer::is_modified(self)
    }

    fn caret_position(&self) -> Position {
        TextBuffer::caret_position(self)
    }
}
