//! Document management.
//!
//! ## Type Aliases and Newtypes
//!
//! `DocumentId` is a newtype wrapper around `Uuid`. This provides:
//! - Type safety: Can't accidentally use a tab index as a document ID
//! - Stability: the id survives tabs being closed and reordered
//!
//! ## Lifecycle
//!
//! ```text
//!  new() ──► Clean+Untitled ──edit──► Dirty+Untitled
//!                                          │ save_as(p)
//!  open(p) ──► Clean ◄──save()/save_as()───┘
//!                │ edit
//!                ▼
//!              Dirty ──load()/reload()──► Clean
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use ted_buffer::{Position, Selection, TextBuffer};
use uuid::Uuid;

use crate::handle::TextHandle;
use crate::{CoreError, CoreResult};

/// Title shown for documents that have never been saved.
pub const UNTITLED_TITLE: &str = "Untitled";

/// Absolute, symlink-free spelling of `path`, used to tell files apart.
///
/// A path that does not exist yet keeps its file name under its resolved
/// parent directory.
pub fn normalize_path(path: &Path) -> io::Result<PathBuf> {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return Ok(resolved);
    }
    let absolute = std::path::absolute(path)?;
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => std::fs::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    };
    Ok(resolved)
}

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single open file or untitled buffer.
///
/// ## Composition over Inheritance
///
/// `Document` owns a buffer through the `TextHandle` seam and adds the
/// file identity on top. The dirty flag is the buffer's own.
pub struct Document<B = TextBuffer> {
    /// Unique identifier
    id: DocumentId,

    /// The underlying text buffer, owned exclusively
    buffer: B,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    title: String,
}

impl<B: TextHandle + Default> Document<B> {
    /// Creates a new empty, untitled document.
    pub fn new() -> Self {
        Self::with_buffer(B::default())
    }

    /// Opens a document from a file.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let mut doc = Self::new();
        doc.load(path)?;
        Ok(doc)
    }
}

impl<B: TextHandle> Document<B> {
    /// Wraps an existing buffer as an untitled document.
    pub fn with_buffer(buffer: B) -> Self {
        Self {
            id: DocumentId::new(),
            buffer,
            path: None,
            title: UNTITLED_TITLE.to_string(),
        }
    }

    /// Derives the display title from a path's file name.
    fn title_for(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    // ==================== Getters ====================

    /// Returns the document ID.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns true if the document has never been saved.
    pub fn is_untitled(&self) -> bool {
        self.path.is_none()
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Returns the text buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Returns a mutable reference to the buffer.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Returns all text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Returns the caret as line/column.
    pub fn caret_position(&self) -> Position {
        self.buffer.caret_position()
    }

    // ==================== File Operations ====================

    /// Replaces the content with the file at `path`.
    ///
    /// On success the document is clean and titled after `path`, which is
    /// stored normalized; on failure nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = normalize_path(path.as_ref())?;
        self.buffer.load(&path)?;
        self.title = Self::title_for(&path);
        tracing::debug!(path = %path.display(), "document loaded");
        self.path = Some(path);
        Ok(())
    }

    /// Reloads the content from the document's path, discarding edits.
    pub fn reload(&mut self) -> CoreResult<()> {
        let path = self.path.clone().ok_or(CoreError::Untitled)?;
        self.load(path)
    }

    /// Saves the document to its path.
    ///
    /// An untitled document has nowhere to go; the caller must resolve a
    /// path and use `save_as`.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self.path.as_deref().ok_or(CoreError::Untitled)?;
        self.buffer.save(path)?;
        Ok(())
    }

    /// Saves the document to a new path.
    ///
    /// On failure the path, title and dirty flag stay as they were.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = normalize_path(path.as_ref())?;
        self.buffer.save(&path)?;
        self.title = Self::title_for(&path);
        self.path = Some(path);
        Ok(())
    }

    // ==================== Text Editing ====================

    /// Types `text` over the selection, leaving the caret after it.
    pub fn insert_at_caret(&mut self, text: &str) -> CoreResult<()> {
        let range = self.buffer.selection().range();
        let inserted = self.buffer.replace_range(range, text)?;
        self.buffer.set_selection(Selection::caret(inserted.end));
        Ok(())
    }

    /// Returns the selected text.
    pub fn selected_text(&self) -> Option<String> {
        let selection = self.buffer.selection();
        if selection.is_empty() {
            return None;
        }
        self.buffer.text_range(selection.range())
    }

    /// Deletes the selection, returning what was removed.
    pub fn delete_selection(&mut self) -> CoreResult<Option<String>> {
        let Some(removed) = self.selected_text() else {
            return Ok(None);
        };
        let range = self.buffer.selection().range();
        let start = self.buffer.replace_range(range, "")?.start;
        self.buffer.set_selection(Selection::caret(start));
        Ok(Some(removed))
    }

    /// Selects all text.
    pub fn select_all(&mut self) {
        let len = self.buffer.len_chars();
        self.buffer.set_selection(Selection::new(0, len));
    }

    /// Moves the selection.
    pub fn set_selection(&mut self, selection: Selection) {
        self.buffer.set_selection(selection);
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last action.
    pub fn undo(&mut self) -> CoreResult<()> {
        self.buffer.undo()?;
        Ok(())
    }

    /// Redoes the last undone action.
    pub fn redo(&mut self) -> CoreResult<()> {
        self.buffer.redo()?;
        Ok(())
    }
}

impl<B: TextHandle + Default> Default for Document<B> {
    fn default() -> Self {
        Self::new()
    }
}
