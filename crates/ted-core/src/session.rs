//! The set of open documents and everything that opens, saves or closes
//! them.
//!
//! ## Closing
//!
//! Closing one dirty document asks the user first:
//!
//! ```text
//!            clean ───────────────────────────────► Closed
//!   dirty ─► ask ─┬─ Cancel ──────────────────────► Aborted
//!                 ├─ No ─── discard ──────────────► Closed
//!                 └─ Yes ── untitled? ─ Save dialog ┬─ cancelled ► Aborted
//!                                  │                 └─ path ─┐
//!                                  └── titled ─────────────── save ─┬─ ok ─► Closed
//!                                                                   └─ error ► Aborted
//! ```
//!
//! Close-all runs that flow left to right and stops at the first
//! `Aborted`. Documents already closed stay closed; the rest are untouched.

use std::path::Path;

use ted_buffer::TextBuffer;

use crate::command::Action;
use crate::config::Config;
use crate::document::{normalize_path, Document, DocumentId};
use crate::event::{EventBus, SessionEvent};
use crate::frontend::{Answer, Frontend};
use crate::handle::TextHandle;
use crate::search::{self, FindMode, ReplaceAllResult, ReplaceOutcome, SearchState, WrapResult};
use crate::state::PersistedState;
use crate::{CoreError, CoreResult};

/// Name shown in window titles.
pub const APP_NAME: &str = "Ted";

/// Result of closing one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The user backed out; the document is still open
    Aborted,
}

/// Result of closing every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAllOutcome {
    /// How many documents were closed before stopping
    pub closed: usize,
    /// Whether the user stopped the pass
    pub aborted: bool,
}

/// Open documents in tab order plus the active one.
///
/// ## Invariant
///
/// `active` is `None` iff `documents` is empty, and otherwise a valid
/// index into it.
pub struct Session<B = TextBuffer> {
    /// Open documents in tab order
    documents: Vec<Document<B>>,

    /// Index of the active document
    active: Option<usize>,

    /// Dialogs, notifications and menu
    frontend: Frontend,

    /// User settings
    config: Config,

    /// Recent files and last search
    state: PersistedState,

    /// The open find/replace flow, if any
    search: Option<SearchState>,

    /// Internal clipboard for cut/copy/paste
    clipboard: String,

    /// Event bus for notifications
    events: EventBus,

    /// Set once `quit` has closed everything
    finished: bool,
}

impl<B: TextHandle> Session<B> {
    /// Creates an empty session.
    pub fn new(frontend: Frontend, config: Config, state: PersistedState) -> Self {
        let mut session = Self {
            documents: Vec::new(),
            active: None,
            frontend,
            config,
            state,
            search: None,
            clipboard: String::new(),
            events: EventBus::new(),
            finished: false,
        };
        session.refresh_menu();
        session
    }

    // ==================== Queries ====================

    /// Returns the open documents in tab order.
    pub fn documents(&self) -> &[Document<B>] {
        &self.documents
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the index of the active document.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Returns the active document.
    pub fn active_document(&self) -> CoreResult<&Document<B>> {
        self.active
            .and_then(|i| self.documents.get(i))
            .ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a mutable reference to the active document.
    pub fn active_document_mut(&mut self) -> CoreResult<&mut Document<B>> {
        self.active
            .and_then(|i| self.documents.get_mut(i))
            .ok_or(CoreError::NoActiveDocument)
    }

    /// Returns a document by ID.
    pub fn document(&self, id: DocumentId) -> CoreResult<&Document<B>> {
        self.index_of(id)
            .map(|i| &self.documents[i])
            .ok_or(CoreError::DocumentNotFound(id))
    }

    /// Returns a document's tab index.
    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id() == id)
    }

    /// Finds a document by path.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.path() == Some(path))
            .map(|d| d.id())
    }

    /// Returns true if any document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.documents.iter().any(|d| d.is_modified())
    }

    /// Title for the main window: `"notes.txt* - Ted"`, or just `"Ted"`.
    pub fn window_title(&self) -> String {
        match self.active_document() {
            Ok(doc) => {
                let marker = if doc.is_modified() { "*" } else { "" };
                format!("{}{} - {}", doc.title(), marker, APP_NAME)
            }
            Err(_) => APP_NAME.to_string(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// State to write back on shutdown.
    pub fn persisted_state(&self) -> &PersistedState {
        &self.state
    }

    /// Returns the clipboard content.
    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Returns true once `quit` has succeeded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ==================== Tabs ====================

    /// Appends a document and makes it active.
    pub fn add_document(&mut self, doc: Document<B>) -> DocumentId {
        let id = doc.id();
        self.documents.push(doc);
        self.active = Some(self.documents.len() - 1);

        self.events.emit(SessionEvent::DocumentOpened(id));
        self.events.emit(SessionEvent::DocumentFocused(id));
        self.refresh_menu();
        id
    }

    /// Makes a document active.
    pub fn select(&mut self, id: DocumentId) -> CoreResult<()> {
        let index = self.index_of(id).ok_or(CoreError::DocumentNotFound(id))?;
        self.activate_index(index)
    }

    /// Makes the document at tab `index` active.
    pub fn activate_index(&mut self, index: usize) -> CoreResult<()> {
        let id = self
            .documents
            .get(index)
            .map(|d| d.id())
            .ok_or(CoreError::NoActiveDocument)?;
        self.active = Some(index);
        self.events.emit(SessionEvent::DocumentFocused(id));
        self.refresh_menu();
        Ok(())
    }

    /// Removes the document at `index` and picks the next active one:
    /// the tab that slides into its place, or the new last tab.
    fn remove_at(&mut self, index: usize) {
        let doc = self.documents.remove(index);
        let remaining = self.documents.len();

        self.active = match self.active {
            _ if remaining == 0 => None,
            Some(a) if a > index => Some(a - 1),
            Some(a) if a == index => Some(index.min(remaining - 1)),
            other => other,
        };

        tracing::info!(title = doc.title(), "document closed");
        self.events.emit(SessionEvent::DocumentClosed(doc.id()));
        if let Some(active) = self.active {
            self.events
                .emit(SessionEvent::DocumentFocused(self.documents[active].id()));
        }
        self.refresh_menu();
    }

    /// Pushes the enabled state of every menu entry to the frontend.
    pub fn refresh_menu(&mut self) {
        let has_documents = !self.documents.is_empty();
        for action in Action::ALL {
            let enabled = !action.requires_document() || has_documents;
            self.frontend.menu.set_enabled(action, enabled);
        }
    }

    // ==================== Saving ====================

    /// Saves the active document, asking for a path if it has none.
    ///
    /// Returns `Ok(false)` if the user cancelled the Save dialog; nothing
    /// changed in that case.
    pub fn save_active(&mut self) -> CoreResult<bool> {
        let index = self.active.ok_or(CoreError::NoActiveDocument)?;
        self.save_at(index, false)
    }

    /// Saves the active document under a path chosen in the Save dialog.
    pub fn save_active_as(&mut self) -> CoreResult<bool> {
        let index = self.active.ok_or(CoreError::NoActiveDocument)?;
        self.save_at(index, true)
    }

    /// Saves one document. I/O failures are reported to the user and
    /// returned.
    fn save_at(&mut self, index: usize, choose_path: bool) -> CoreResult<bool> {
        let needs_path = choose_path || self.documents[index].is_untitled();

        let result = if needs_path {
            let Some(path) = self.frontend.files.show_save() else {
                tracing::debug!("save dialog cancelled");
                return Ok(false);
            };
            let doc = &mut self.documents[index];
            let result = doc.save_as(&path);
            // Recorded under the normalized path the document now carries
            if let (Ok(()), Some(saved)) = (&result, doc.path()) {
                self.state.add_recent(saved, self.config.files.recent_limit);
            }
            result
        } else {
            self.documents[index].save()
        };

        let doc = &self.documents[index];
        match result {
            Ok(()) => {
                tracing::info!(title = doc.title(), "document saved");
                self.events.emit(SessionEvent::DocumentSaved(doc.id()));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(title = doc.title(), "save failed: {}", e);
                let message = format!("Could not save {}: {}", doc.title(), e);
                self.frontend.notifier.notify(&message);
                Err(e)
            }
        }
    }

    // ==================== Closing ====================

    /// Closes one document, asking about unsaved changes.
    pub fn close(&mut self, id: DocumentId) -> CoreResult<CloseOutcome> {
        let index = self.index_of(id).ok_or(CoreError::DocumentNotFound(id))?;
        let doc = &self.documents[index];

        if doc.is_modified() {
            let message = format!("Save changes to {}?", doc.title());
            match self.frontend.confirm.ask(&message) {
                Answer::Cancel => {
                    tracing::debug!("close cancelled");
                    return Ok(CloseOutcome::Aborted);
                }
                Answer::No => {
                    tracing::debug!("discarding unsaved changes");
                }
                Answer::Yes => match self.save_at(index, false) {
                    Ok(true) => {}
                    // Dialog cancelled, or the failure was already reported
                    Ok(false) | Err(_) => return Ok(CloseOutcome::Aborted),
                },
            }
        }

        self.remove_at(index);
        Ok(CloseOutcome::Closed)
    }

    /// Closes the active document.
    pub fn close_active(&mut self) -> CoreResult<CloseOutcome> {
        let id = self.active_document()?.id();
        self.close(id)
    }

    /// Closes every document left to right, stopping at the first abort.
    pub fn close_all(&mut self) -> CoreResult<CloseAllOutcome> {
        let ids: Vec<DocumentId> = self.documents.iter().map(|d| d.id()).collect();
        let mut closed = 0;

        for id in ids {
            match self.close(id)? {
                CloseOutcome::Closed => closed += 1,
                CloseOutcome::Aborted => {
                    tracing::debug!(closed, "close all aborted");
                    return Ok(CloseAllOutcome {
                        closed,
                        aborted: true,
                    });
                }
            }
        }

        Ok(CloseAllOutcome {
            closed,
            aborted: false,
        })
    }

    /// Closes everything for shutdown. Returns false if the user aborted.
    pub fn quit(&mut self) -> CoreResult<bool> {
        if self.close_all()?.aborted {
            return Ok(false);
        }
        self.finished = true;
        self.events.emit(SessionEvent::Quit);
        Ok(true)
    }

    // ==================== Find / Replace ====================

    /// Opens (or updates) the find/replace flow.
    pub fn begin_search(&mut self, search: SearchState) {
        self.state.last_search = Some(search.clone());
        self.search = Some(search);
    }

    /// Closes the find/replace flow, discarding its state.
    pub fn end_search(&mut self) {
        self.search = None;
    }

    /// The open find/replace flow.
    pub fn search_state(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    /// The search to run: the open flow, else the last one used.
    fn current_search(&self) -> CoreResult<SearchState> {
        let search = self
            .search
            .as_ref()
            .or(self.state.last_search.as_ref())
            .cloned()
            .unwrap_or_default();
        if search.pattern.is_empty() {
            return Err(CoreError::EmptyPattern);
        }
        Ok(search)
    }

    fn report(&mut self, result: &WrapResult) {
        if let Some(notice) = result.notice() {
            self.frontend.notifier.notify(notice);
        }
    }

    fn run_find(&mut self, mode: FindMode) -> CoreResult<WrapResult> {
        let search = self.current_search()?;
        let doc = self.active_document_mut()?;
        let result = search::find_or_advance(doc.buffer_mut(), &search.pattern, search.flags, mode);
        let id = doc.id();

        if result.is_found() {
            self.events.emit(SessionEvent::SelectionChanged(id));
        }
        self.report(&result);
        Ok(result)
    }

    /// Find from the caret.
    pub fn find(&mut self) -> CoreResult<WrapResult> {
        self.run_find(FindMode::Fresh)
    }

    /// Find after the current selection.
    pub fn find_next(&mut self) -> CoreResult<WrapResult> {
        self.run_find(FindMode::Next)
    }

    /// Replaces the selection if it is a match, then selects the next one.
    pub fn replace(&mut self) -> CoreResult<ReplaceOutcome> {
        let search = self.current_search()?;
        let doc = self.active_document_mut()?;
        let outcome = search::replace_current_if_matches(
            doc.buffer_mut(),
            &search.pattern,
            &search.replacement,
            search.flags,
        )?;
        let id = doc.id();

        if outcome.replaced {
            self.events.emit(SessionEvent::DocumentChanged(id));
        }
        if outcome.next.is_found() {
            self.events.emit(SessionEvent::SelectionChanged(id));
        }
        self.report(&outcome.next);
        Ok(outcome)
    }

    /// Replaces every match in the active document as one undo step.
    pub fn replace_all(&mut self) -> CoreResult<ReplaceAllResult> {
        let search = self.current_search()?;
        let doc = self.active_document_mut()?;
        let result = search::replace_all(
            doc.buffer_mut(),
            &search.pattern,
            &search.replacement,
            search.flags,
        )?;
        let id = doc.id();

        if result.count > 0 {
            self.events.emit(SessionEvent::DocumentChanged(id));
        }
        let message = format!("Replaced {} occurrences", result.count);
        self.frontend.notifier.notify(&message);
        Ok(result)
    }

    // ==================== Editing ====================

    fn edit_active<T>(
        &mut self,
        f: impl FnOnce(&mut Document<B>) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let doc = self.active_document_mut()?;
        let value = f(doc)?;
        let id = doc.id();
        self.events.emit(SessionEvent::DocumentChanged(id));
        Ok(value)
    }

    /// Types text at the caret of the active document.
    pub fn insert_text(&mut self, text: &str) -> CoreResult<()> {
        self.edit_active(|doc| doc.insert_at_caret(text))
    }

    /// Undoes the last action.
    pub fn undo(&mut self) -> CoreResult<()> {
        self.edit_active(|doc| doc.undo())
    }

    /// Redoes the last undone action.
    pub fn redo(&mut self) -> CoreResult<()> {
        self.edit_active(|doc| doc.redo())
    }

    /// Copies selection to clipboard.
    pub fn copy(&mut self) -> CoreResult<()> {
        if let Some(text) = self.active_document()?.selected_text() {
            self.clipboard = text;
        }
        Ok(())
    }

    /// Cuts selection to clipboard.
    pub fn cut(&mut self) -> CoreResult<()> {
        if let Some(text) = self.edit_active(|doc| doc.delete_selection())? {
            self.clipboard = text;
        }
        Ok(())
    }

    /// Pastes from clipboard.
    pub fn paste(&mut self) -> CoreResult<()> {
        let text = self.clipboard.clone();
        self.insert_text(&text)
    }

    /// Selects all text.
    pub fn select_all(&mut self) -> CoreResult<()> {
        let doc = self.active_document_mut()?;
        doc.select_all();
        let id = doc.id();
        self.events.emit(SessionEvent::SelectionChanged(id));
        Ok(())
    }
}

impl<B: TextHandle + Default> Session<B> {
    /// Creates a new untitled document and makes it active.
    pub fn new_document(&mut self) -> DocumentId {
        let id = self.add_document(Document::new());
        tracing::info!(%id, "new document");
        id
    }

    /// Opens a file in a new document and makes it active.
    ///
    /// A file that is already open, under any spelling of its path, is
    /// activated instead. On failure the session is unchanged and the error
    /// is reported and returned.
    pub fn open(&mut self, path: impl AsRef<Path>) -> CoreResult<DocumentId> {
        let path = path.as_ref();

        let normalized = match normalize_path(path) {
            Ok(normalized) => normalized,
            Err(e) => return Err(self.open_failed(path, e.into())),
        };

        if let Some(id) = self.find_by_path(&normalized) {
            self.select(id)?;
            return Ok(id);
        }

        match Document::open(&normalized) {
            Ok(doc) => {
                self.state
                    .add_recent(&normalized, self.config.files.recent_limit);
                let id = self.add_document(doc);
                tracing::info!(path = %normalized.display(), "document opened");
                Ok(id)
            }
            Err(e) => Err(self.open_failed(path, e)),
        }
    }

    /// Reports a failed open and hands the error back.
    fn open_failed(&mut self, path: &Path, e: CoreError) -> CoreError {
        tracing::warn!(path = %path.display(), "open failed: {}", e);
        let message = format!("Could not open {}: {}", path.display(), e);
        self.frontend.notifier.notify(&message);
        e
    }

    /// Asks for a file and opens it. `Ok(None)` if the dialog was cancelled.
    pub fn open_with_dialog(&mut self) -> CoreResult<Option<DocumentId>> {
        match self.frontend.files.show_open() {
            Some(path) => self.open(path).map(Some),
            None => Ok(None),
        }
    }
}
