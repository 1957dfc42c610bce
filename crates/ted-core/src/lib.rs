//! # Ted Core
//!
//! Document session lifecycle and find/replace engine.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Session                           │
//! │  ┌───────────┐ ┌──────────┐ ┌──────────────────────────┐ │
//! │  │  Command  │ │ Frontend │ │ Config / PersistedState  │ │
//! │  └───────────┘ └──────────┘ └──────────────────────────┘ │
//! │        │                                                  │
//! │  ┌─────┴───────────────────────────────────┐             │
//! │  │       Documents (tab order)             │──► search   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐    │             │
//! │  │  │  Doc 1  │ │  Doc 2  │ │  Doc 3  │    │             │
//! │  │  └─────────┘ └─────────┘ └─────────┘    │             │
//! │  └─────────────────────────────────────────┘             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is synchronous. Dialogs are plain calls on the
//! [`Frontend`] collaborators and return once the user has answered.

pub mod command;
pub mod config;
pub mod document;
pub mod event;
pub mod frontend;
pub mod handle;
pub mod search;
pub mod session;
pub mod state;

pub use command::{Action, Command};
pub use config::{Config, ConfigError};
pub use document::{Document, DocumentId};
pub use event::{EventBus, EventHandler, SessionEvent};
pub use frontend::{Answer, ConfirmationDialog, FileDialog, Frontend, MenuState, Notifier};
pub use handle::TextHandle;
pub use search::{ReplaceAllResult, ReplaceOutcome, SearchFlags, SearchState, WrapResult};
pub use session::{CloseAllOutcome, CloseOutcome, Session};
pub use state::PersistedState;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No active document")]
    NoActiveDocument,

    #[error("Document has no file name yet")]
    Untitled,

    #[error("Search pattern is empty")]
    EmptyPattern,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Buffer(#[from] ted_buffer::BufferError),
}

impl CoreError {
    /// True for failures that came from the file system.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            CoreError::Io(_) | CoreError::Buffer(ted_buffer::BufferError::Io(_))
        )
    }
}
