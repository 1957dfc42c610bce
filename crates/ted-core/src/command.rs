//! Command system for session actions.
//!
//! ## The Command Pattern
//!
//! Commands encapsulate user requests as values:
//! - A menu, a key binding or a console line all produce the same `Command`
//! - `Session::dispatch` is the single place that runs them
//!
//! `Action` is the payload-free twin used for menu enablement.

use std::path::PathBuf;

use crate::handle::TextHandle;
use crate::search::SearchState;
use crate::session::Session;
use crate::CoreResult;

/// Menu entries whose enabled state the session maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    New,
    Open,
    Save,
    SaveAs,
    Close,
    CloseAll,
    Quit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Find,
    FindNext,
    Replace,
    ReplaceAll,
}

impl Action {
    /// Every menu entry in menu order.
    pub const ALL: [Action; 17] = [
        Action::New,
        Action::Open,
        Action::Save,
        Action::SaveAs,
        Action::Close,
        Action::CloseAll,
        Action::Quit,
        Action::Undo,
        Action::Redo,
        Action::Cut,
        Action::Copy,
        Action::Paste,
        Action::SelectAll,
        Action::Find,
        Action::FindNext,
        Action::Replace,
        Action::ReplaceAll,
    ];

    /// Whether the entry is only enabled while a document is open.
    pub fn requires_document(self) -> bool {
        !matches!(self, Action::New | Action::Open | Action::Quit)
    }

    /// Returns the menu label.
    pub fn display_name(self) -> &'static str {
        match self {
            Action::New => "New",
            Action::Open => "Open",
            Action::Save => "Save",
            Action::SaveAs => "Save As",
            Action::Close => "Close",
            Action::CloseAll => "Close All",
            Action::Quit => "Quit",
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::Cut => "Cut",
            Action::Copy => "Copy",
            Action::Paste => "Paste",
            Action::SelectAll => "Select All",
            Action::Find => "Find",
            Action::FindNext => "Find Next",
            Action::Replace => "Replace",
            Action::ReplaceAll => "Replace All",
        }
    }
}

/// Built-in session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // File commands
    NewFile,
    /// `None` asks the file dialog
    OpenFile { path: Option<PathBuf> },
    Save,
    SaveAs,
    Close,
    CloseAll,
    Quit,

    // Edit commands
    InsertText(String),
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    /// Switch to the tab at this index
    Activate(usize),

    // Search
    Find(SearchState),
    FindNext,
    Replace(SearchState),
    ReplaceAll(SearchState),
    CloseSearch,
}

impl Command {
    /// The menu entry this command belongs to, if any.
    pub fn action(&self) -> Option<Action> {
        let action = match self {
            Command::NewFile => Action::New,
            Command::OpenFile { .. } => Action::Open,
            Command::Save => Action::Save,
            Command::SaveAs => Action::SaveAs,
            Command::Close => Action::Close,
            Command::CloseAll => Action::CloseAll,
            Command::Quit => Action::Quit,
            Command::Undo => Action::Undo,
            Command::Redo => Action::Redo,
            Command::Cut => Action::Cut,
            Command::Copy => Action::Copy,
            Command::Paste => Action::Paste,
            Command::SelectAll => Action::SelectAll,
            Command::Find(_) => Action::Find,
            Command::FindNext => Action::FindNext,
            Command::Replace(_) => Action::Replace,
            Command::ReplaceAll(_) => Action::ReplaceAll,
            Command::InsertText(_) | Command::Activate(_) | Command::CloseSearch => return None,
        };
        Some(action)
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::InsertText(_) => "Insert Text",
            Command::Activate(_) => "Switch Document",
            Command::CloseSearch => "Close Search",
            other => other.action().map_or("", Action::display_name),
        }
    }
}

impl<B: TextHandle + Default> Session<B> {
    /// Executes a command against the session.
    ///
    /// Dialog cancellations and aborted closes are not errors; they simply
    /// leave the session as it was.
    pub fn dispatch(&mut self, cmd: Command) -> CoreResult<()> {
        tracing::debug!(command = cmd.display_name(), "dispatch");

        match cmd {
            // File commands
            Command::NewFile => {
                self.new_document();
            }
            Command::OpenFile { path: Some(path) } => {
                self.open(path)?;
            }
            Command::OpenFile { path: None } => {
                self.open_with_dialog()?;
            }
            Command::Save => {
                self.save_active()?;
            }
            Command::SaveAs => {
                self.save_active_as()?;
            }
            Command::Close => {
                self.close_active()?;
            }
            Command::CloseAll => {
                self.close_all()?;
            }
            Command::Quit => {
                self.quit()?;
            }

            // Edit commands
            Command::InsertText(text) => self.insert_text(&text)?,
            Command::Undo => self.undo()?,
            Command::Redo => self.redo()?,
            Command::Cut => self.cut()?,
            Command::Copy => self.copy()?,
            Command::Paste => self.paste()?,
            Command::SelectAll => self.select_all()?,
            Command::Activate(index) => self.activate_index(index)?,

            // Search
            Command::Find(search) => {
                self.begin_search(search);
                self.find()?;
            }
            Command::FindNext => {
                self.find_next()?;
            }
            Command::Replace(search) => {
                self.begin_search(search);
                self.replace()?;
            }
            Command::ReplaceAll(search) => {
                self.begin_search(search);
                self.replace_all()?;
            }
            Command::CloseSearch => self.end_search(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::frontend::Frontend;
    use crate::state::PersistedState;
    use crate::CoreError;

    fn session() -> Session {
        Session::new(Frontend::headless(), Config::default(), PersistedState::default())
    }

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Save.display_name(), "Save");
        assert_eq!(Command::ReplaceAll(SearchState::new("a")).display_name(), "Replace All");
        assert_eq!(Command::CloseSearch.display_name(), "Close Search");
    }

    #[test]
    fn test_actions_needing_a_document() {
        assert!(!Action::New.requires_document());
        assert!(!Action::Open.requires_document());
        assert!(!Action::Quit.requires_document());
        let needing = Action::ALL.iter().filter(|a| a.requires_document()).count();
        assert_eq!(needing, Action::ALL.len() - 3);
    }

    #[test]
    fn test_every_action_has_a_command() {
        assert_eq!(Command::OpenFile { path: None }.action(), Some(Action::Open));
        assert_eq!(Command::Find(SearchState::default()).action(), Some(Action::Find));
        assert_eq!(Command::InsertText("x".into()).action(), None);
    }

    #[test]
    fn test_dispatch_editing() {
        let mut session = session();
        session.dispatch(Command::NewFile).unwrap();
        session.dispatch(Command::InsertText("one two one".into())).unwrap();
        session
            .dispatch(Command::ReplaceAll(SearchState::new("one").with_replacement("1")))
            .unwrap();
        assert_eq!(session.active_document().unwrap().text(), "1 two 1");

        session.dispatch(Command::Undo).unwrap();
        assert_eq!(session.active_document().unwrap().text(), "one two one");
    }

    #[test]
    fn test_dispatch_without_document() {
        let mut session = session();
        assert!(matches!(
            session.dispatch(Command::Undo),
            Err(CoreError::NoActiveDocument)
        ));
        // Headless dialogs cancel, which is not an error
        session.dispatch(Command::OpenFile { path: None }).unwrap();
        assert!(session.is_empty());
    }

    #[test]
    fn test_dispatch_quit_with_headless_frontend() {
        let mut session = session();
        session.dispatch(Command::NewFile).unwrap();
        session.dispatch(Command::InsertText("unsaved".into())).unwrap();

        // Headless answers Cancel, so nothing is lost
        session.dispatch(Command::Quit).unwrap();
        assert!(!session.is_finished());
        assert_eq!(session.len(), 1);

        session.dispatch(Command::Close).unwrap();
        assert_eq!(session.len(), 1);
    }
}
