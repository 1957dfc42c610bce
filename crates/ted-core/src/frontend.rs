//! What the session needs from whatever is drawing it.
//!
//! Every method is a blocking call: a dialog returns only once the user
//! has answered, so no other session operation can run in between.

use std::path::PathBuf;

use crate::command::Action;

/// Three-way answer to "save changes?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Save, then continue
    Yes,
    /// Discard, then continue
    No,
    /// Stop the whole operation
    Cancel,
}

/// Modal yes/no/cancel question.
pub trait ConfirmationDialog {
    fn ask(&mut self, message: &str) -> Answer;
}

/// Modal file pickers. `None` means the user cancelled.
pub trait FileDialog {
    fn show_open(&mut self) -> Option<PathBuf>;
    fn show_save(&mut self) -> Option<PathBuf>;
}

/// One-line user notifications ("Text not found", I/O errors, ...).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Enables and disables menu entries.
pub trait MenuState {
    fn set_enabled(&mut self, action: Action, enabled: bool);
}

/// The collaborators a [`Session`](crate::Session) drives.
pub struct Frontend {
    pub confirm: Box<dyn ConfirmationDialog>,
    pub files: Box<dyn FileDialog>,
    pub notifier: Box<dyn Notifier>,
    pub menu: Box<dyn MenuState>,
}

impl Frontend {
    /// Bundles the four collaborators.
    pub fn new(
        confirm: impl ConfirmationDialog + 'static,
        files: impl FileDialog + 'static,
        notifier: impl Notifier + 'static,
        menu: impl MenuState + 'static,
    ) -> Self {
        Self {
            confirm: Box::new(confirm),
            files: Box::new(files),
            notifier: Box::new(notifier),
            menu: Box::new(menu),
        }
    }

    /// A frontend that answers `Cancel` to everything and ignores the rest.
    pub fn headless() -> Self {
        Self::new(Headless, Headless, Headless, Headless)
    }
}

/// Collaborator used when nobody is watching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl ConfirmationDialog for Headless {
    fn ask(&mut self, message: &str) -> Answer {
        tracing::debug!(message, "headless confirmation, cancelling");
        Answer::Cancel
    }
}

impl FileDialog for Headless {
    fn show_open(&mut self) -> Option<PathBuf> {
        None
    }

    fn show_save(&mut self) -> Option<PathBuf> {
        None
    }
}

impl Notifier for Headless {
    fn notify(&mut self, message: &str) {
        tracing::info!(message, "notification");
    }
}

impl MenuState for Headless {
    fn set_enabled(&mut self, _action: Action, _enabled: bool) {}
}
