//! Event system for session notifications.
//!
//! ## Observer Pattern in Rust
//!
//! Instead of holding callbacks, the session publishes plain values on a
//! `tokio::sync::broadcast` channel:
//! - No object references to manage
//! - Sending never blocks and works without any subscriber
//! - Subscribers receive clones

use crate::document::DocumentId;
use tokio::sync::broadcast;

/// Events the session publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A document was added to the session
    DocumentOpened(DocumentId),
    /// A document was removed from the session
    DocumentClosed(DocumentId),
    /// A document was written to disk
    DocumentSaved(DocumentId),
    /// A document's content changed through a session command
    DocumentChanged(DocumentId),
    /// A document became the active one
    DocumentFocused(DocumentId),
    /// The selection moved (find, select-all)
    SelectionChanged(DocumentId),
    /// Every document was closed for shutdown
    Quit,
}

/// Event bus for broadcasting session events.
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for consuming events between session calls.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(session.subscribe());
///
/// session.dispatch(Command::Save)?;
/// for event in handler.drain() {
///     if let SessionEvent::DocumentSaved(id) = event {
///         // refresh the tab label
///     }
/// }
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Drains whatever is already queued without waiting.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return events,
            }
        }
    }
}
