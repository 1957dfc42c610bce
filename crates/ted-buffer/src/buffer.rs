//! Core text buffer implementation using rope data structure.
//!
//! ## Why Rope?
//!
//! - **Large files**: O(log n) insertions/deletions vs O(n) for arrays
//! - **Replace-all**: many small range replacements stay cheap
//! - **Char indexing**: ropey converts between char, byte and line offsets
//!
//! ## Ownership in Action
//!
//! ```rust,ignore
//! let buffer = TextBuffer::new();  // buffer OWNS the rope
//! let text = buffer.text();        // text BORROWS from buffer
//! // buffer.insert(0, "x");        // ERROR! Can't mutate while borrowed
//! drop(text);                      // Release borrow
//! buffer.insert(0, "x");           // Now OK!
//! ```

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::history::{Edit, EditKind, History};
use crate::{BufferError, BufferResult, Position, Selection};

/// A text buffer backed by a rope, with a selection and undo history.
///
/// # Thread Safety
///
/// `TextBuffer` is `Send` but not `Sync` - it can be moved between threads
/// but shouldn't be accessed from multiple threads simultaneously.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Edit history for undo/redo
    history: History,

    /// Current selection; the head is the caret
    selection: Selection,

    /// Path the content was last loaded from or saved to
    file_path: Option<PathBuf>,

    /// Buffer-specific settings
    config: BufferConfig,
}

/// Configuration for buffer behavior
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Maximum undo groups to keep
    pub max_history: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { max_history: 1000 }
    }
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use ted_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Creates a buffer with custom configuration.
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            rope: Rope::new(),
            history: History::new(config.max_history),
            selection: Selection::default(),
            file_path: None,
            config,
        }
    }

    /// Loads a buffer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> BufferResult<Self> {
        let mut buffer = Self::new();
        buffer.load(path)?;
        Ok(buffer)
    }

    /// Replaces the whole content with the file at `path`.
    ///
    /// History is cleared and the buffer becomes unmodified. On error the
    /// buffer is left exactly as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        self.rope = Rope::from_str(&content);
        self.history.clear();
        self.selection = Selection::default();
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Saves the buffer to its associated file.
    pub fn save(&mut self) -> BufferResult<()> {
        let path = self.file_path.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No file path set")
        })?;
        self.save_as(&path)
    }

    /// Saves the buffer to a specific path.
    ///
    /// Content goes to a sibling temporary file first and is renamed over
    /// the target, so a failed write never truncates the existing file. The
    /// buffer's path and modified flag only change on success.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();
        let temp_path = Self::temp_path_for(path);

        std::fs::write(&temp_path, self.text().as_bytes())?;
        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        self.file_path = Some(path.to_path_buf());
        self.history.mark_save_point();
        Ok(())
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    // ==================== Text Access ====================

    /// Returns the entire text content as a `Cow<str>`.
    ///
    /// Borrowed when the rope is a single chunk, allocated otherwise.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of bytes in the buffer.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        self.history.push(Edit::insert(char_idx, text));
        self.apply_insert(char_idx, text);
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted: String = self.rope.slice(range.clone()).into();
        self.history.push(Edit::delete(range.start, deleted.clone()));
        self.apply_delete(range);
        Ok(deleted)
    }

    /// Replaces text in a range with new text.
    ///
    /// Recorded as a single undo step. Returns the range now covered by
    /// `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<Range<usize>> {
        self.check_range(&range)?;

        self.history.begin_group();
        let result = self
            .delete(range.clone())
            .and_then(|_| self.insert(range.start, text));
        self.history.end_group();
        result?;

        Ok(range.start..range.start + text.chars().count())
    }

    /// Opens an undo group; edits until the matching `end_undo_group`
    /// undo together.
    pub fn begin_undo_group(&mut self) {
        self.history.begin_group();
    }

    /// Closes the undo group opened by `begin_undo_group`.
    pub fn end_undo_group(&mut self) {
        self.history.end_group();
    }

    fn check_range(&self, range: &Range<usize>) -> BufferResult<()> {
        if range.start > range.end {
            return Err(BufferError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(())
    }

    /// Inserts into the rope and shifts the selection. Not recorded.
    fn apply_insert(&mut self, char_idx: usize, text: &str) {
        self.rope.insert(char_idx, text);
        let len = text.chars().count();
        let shift = |p: usize| if p > char_idx { p + len } else { p };
        self.selection = Selection::new(shift(self.selection.anchor), shift(self.selection.head));
    }

    /// Removes from the rope and shifts the selection. Not recorded.
    fn apply_delete(&mut self, range: Range<usize>) {
        let len = range.len();
        self.rope.remove(range.clone());
        let shift = |p: usize| {
            if p >= range.end {
                p - len
            } else if p > range.start {
                range.start
            } else {
                p
            }
        };
        self.selection = Selection::new(shift(self.selection.anchor), shift(self.selection.head));
    }

    fn apply(&mut self, edit: &Edit) {
        match edit.kind {
            EditKind::Insert => self.apply_insert(edit.position, &edit.content),
            EditKind::Delete => {
                let end = edit.position + edit.len_chars();
                self.apply_delete(edit.position..end);
            }
        }
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit group.
    ///
    /// Edits are reversed back to front without being recorded again.
    /// The caret lands where the first edit of the group happened.
    pub fn undo(&mut self) -> BufferResult<()> {
        let group = self.history.undo().ok_or(BufferError::NothingToUndo)?;

        for edit in group.edits.iter().rev() {
            self.apply(&edit.inverse());
        }
        if let Some(first) = group.edits.first() {
            self.selection = Selection::caret(first.position.min(self.len_chars()));
        }

        Ok(())
    }

    /// Redoes the last undone edit group.
    pub fn redo(&mut self) -> BufferResult<()> {
        let group = self.history.redo().ok_or(BufferError::NothingToRedo)?;

        for edit in &group.edits {
            self.apply(edit);
        }
        if let Some(last) = group.edits.last() {
            let caret = match last.kind {
                EditKind::Insert => last.position + last.len_chars(),
                EditKind::Delete => last.position,
            };
            self.selection = Selection::caret(caret.min(self.len_chars()));
        }

        Ok(())
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Selection ====================

    /// Returns the current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Sets the selection, clamped to the buffer length.
    pub fn set_selection(&mut self, selection: impl Into<Selection>) {
        self.selection = selection.into().clamp(self.len_chars());
    }

    /// Returns the caret offset.
    pub fn caret(&self) -> usize {
        self.selection.head
    }

    /// Returns the selected text, or `None` for an empty selection.
    pub fn selected_text(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        self.slice(self.selection.range())
            .ok()
            .map(|s| s.into_owned())
    }

    // ==================== Position Conversion ====================

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    /// Returns the caret as a line/column position.
    pub fn caret_position(&self) -> Position {
        self.char_idx_to_position(self.caret())
            .unwrap_or(Position::ZERO)
    }

    // ==================== State Queries ====================

    /// Returns true if the content differs from the last load/save.
    ///
    /// Undoing or redoing back to that point counts as unmodified.
    pub fn is_modified(&self) -> bool {
        !self.history.at_save_point()
    }

    /// Returns the associated file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns the buffer's configuration.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        let mut buffer = Self::new();
        buffer.rope = Rope::from_str(s);
        buffer
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
