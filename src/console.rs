//! Line-oriented frontend.
//!
//! Each input line is one command. Dialogs are plain prompts on the same
//! terminal, so a question blocks the loop until it is answered.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use ted_buffer::Selection;
use ted_core::{
    Action, Answer, Command, ConfirmationDialog, EventHandler, FileDialog, Frontend, MenuState,
    Notifier, SearchFlags, SearchState, Session, SessionEvent,
};

/// Reads one line, without its line ending, after showing `label`.
/// `None` at end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{label}");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Maps a typed reply to an answer. Anything unrecognised cancels.
pub fn parse_answer(reply: &str) -> Answer {
    match reply.trim().to_lowercase().as_str() {
        "y" | "yes" => Answer::Yes,
        "n" | "no" => Answer::No,
        _ => Answer::Cancel,
    }
}

/// Yes/no/cancel prompt.
pub struct ConsoleConfirm;

impl ConfirmationDialog for ConsoleConfirm {
    fn ask(&mut self, message: &str) -> Answer {
        prompt(&format!("{message} [y]es/[n]o/[c]ancel: "))
            .map_or(Answer::Cancel, |reply| parse_answer(&reply))
    }
}

/// File name prompts. An empty reply cancels.
pub struct ConsoleFiles;

impl ConsoleFiles {
    fn ask_path(label: &str) -> Option<PathBuf> {
        prompt(label)
            .map(|reply| reply.trim().to_string())
            .filter(|reply| !reply.is_empty())
            .map(PathBuf::from)
    }
}

impl FileDialog for ConsoleFiles {
    fn show_open(&mut self) -> Option<PathBuf> {
        Self::ask_path("Open file: ")
    }

    fn show_save(&mut self) -> Option<PathBuf> {
        Self::ask_path("Save as: ")
    }
}

/// Prints notifications on their own line.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

/// Remembers which entries are enabled so `help` can show them.
#[derive(Clone, Default)]
pub struct ConsoleMenu {
    enabled: Rc<RefCell<HashMap<Action, bool>>>,
}

impl ConsoleMenu {
    pub fn is_enabled(&self, action: Action) -> bool {
        self.enabled.borrow().get(&action).copied().unwrap_or(false)
    }
}

impl MenuState for ConsoleMenu {
    fn set_enabled(&mut self, action: Action, enabled: bool) {
        self.enabled.borrow_mut().insert(action, enabled);
    }
}

/// Builds the console frontend, returning a handle to its menu state.
pub fn frontend() -> (Frontend, ConsoleMenu) {
    let menu = ConsoleMenu::default();
    let frontend = Frontend::new(ConsoleConfirm, ConsoleFiles, ConsoleNotifier, menu.clone());
    (frontend, menu)
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A session command
    Run(Command),
    /// Select the characters `start..end` of the active document
    Select(usize, usize),
    /// Print the open documents
    List,
    /// Print the active document
    Show,
    Help,
    /// Blank line
    Nothing,
}

/// Errors parsing an input line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Expands `\n` and `\t` in typed text.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parses `[-c] [-w] <pattern> [=> <replacement>]`.
fn parse_search(
    rest: &str,
    defaults: SearchFlags,
    needs_replacement: bool,
    usage: &'static str,
) -> Result<SearchState, ParseError> {
    let mut flags = defaults;
    let mut rest = rest.trim_start();
    loop {
        if let Some(tail) = rest.strip_prefix("-c ") {
            flags.match_case = true;
            rest = tail.trim_start();
        } else if let Some(tail) = rest.strip_prefix("-w ") {
            flags.whole_word = true;
            rest = tail.trim_start();
        } else {
            break;
        }
    }

    let (pattern, replacement) = match rest.split_once(" => ") {
        Some((pattern, replacement)) => (pattern, Some(replacement)),
        None => (rest, None),
    };
    if pattern.is_empty() || (needs_replacement && replacement.is_none()) {
        return Err(ParseError::Usage(usage));
    }

    Ok(SearchState {
        pattern: unescape(pattern),
        replacement: replacement.map(unescape).unwrap_or_default(),
        flags,
    })
}

fn parse_index(word: Option<&str>, usage: &'static str) -> Result<usize, ParseError> {
    word.and_then(|w| w.parse().ok())
        .ok_or(ParseError::Usage(usage))
}

/// Parses one console line.
pub fn parse_line(line: &str, defaults: SearchFlags) -> Result<Input, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(Input::Nothing);
    }
    let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

    let command = match word {
        "new" => Command::NewFile,
        "open" => {
            let path = rest.trim();
            Command::OpenFile {
                path: (!path.is_empty()).then(|| PathBuf::from(path)),
            }
        }
        "save" => Command::Save,
        "saveas" => Command::SaveAs,
        "close" => Command::Close,
        "closeall" => Command::CloseAll,
        "quit" | "exit" => Command::Quit,
        "type" => Command::InsertText(unescape(rest)),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "cut" => Command::Cut,
        "copy" => Command::Copy,
        "paste" => Command::Paste,
        "selectall" => Command::SelectAll,
        "tab" => {
            // Tabs are numbered from 1
            let index = parse_index(Some(rest.trim()), "tab <number>")?;
            if index == 0 {
                return Err(ParseError::Usage("tab <number>"));
            }
            Command::Activate(index - 1)
        }
        "find" => Command::Find(parse_search(rest, defaults, false, "find [-c] [-w] <text>")?),
        "next" => Command::FindNext,
        "replace" => Command::Replace(parse_search(
            rest,
            defaults,
            true,
            "replace [-c] [-w] <text> => <replacement>",
        )?),
        "replaceall" => Command::ReplaceAll(parse_search(
            rest,
            defaults,
            true,
            "replaceall [-c] [-w] <text> => <replacement>",
        )?),
        "endsearch" => Command::CloseSearch,
        "select" => {
            let mut words = rest.split_whitespace();
            let usage = "select <start> <end>";
            let start = parse_index(words.next(), usage)?;
            let end = parse_index(words.next(), usage)?;
            return Ok(Input::Select(start, end));
        }
        "list" | "ls" => return Ok(Input::List),
        "show" => return Ok(Input::Show),
        "help" | "?" => return Ok(Input::Help),
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Input::Run(command))
}

const HELP: &str = "\
  new | open [path] | save | saveas | close | closeall | quit
  type <text>          insert at the caret (\\n for newline)
  select <start> <end> select characters
  undo | redo | cut | copy | paste | selectall
  find [-c] [-w] <text> | next | endsearch
  replace [-c] [-w] <text> => <replacement>
  replaceall [-c] [-w] <text> => <replacement>
  tab <n> | list | show | help";

fn print_help(menu: &ConsoleMenu) {
    println!("{HELP}");
    let enabled: Vec<&str> = Action::ALL
        .into_iter()
        .filter(|&a| menu.is_enabled(a))
        .map(Action::display_name)
        .collect();
    println!("Enabled: {}", enabled.join(", "));
}

fn print_list(session: &Session) {
    if session.is_empty() {
        println!("(no documents)");
        return;
    }
    for (i, doc) in session.documents().iter().enumerate() {
        let active = if session.active_index() == Some(i) { ">" } else { " " };
        let dirty = if doc.is_modified() { "*" } else { "" };
        println!("{active} {}: {}{dirty}", i + 1, doc.title());
    }
}

fn print_active(session: &Session) {
    match session.active_document() {
        Ok(doc) => {
            let selection = doc.buffer().selection();
            println!("{}", doc.text());
            println!(
                "-- {} at {}, selection {}..{}",
                doc.title(),
                doc.caret_position(),
                selection.start(),
                selection.end()
            );
        }
        Err(e) => println!("{e}"),
    }
}

/// Status lines for the events published while handling one input line.
/// Closes are summed into a single line.
fn status_lines(session: &Session, events: &[SessionEvent]) -> Vec<String> {
    let mut lines = Vec::new();
    for event in events {
        if let SessionEvent::DocumentSaved(id) = event {
            if let Some(path) = session.document(*id).ok().and_then(|doc| doc.path()) {
                lines.push(format!("Saved {}", path.display()));
            }
        }
    }

    let closed = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::DocumentClosed(_)))
        .count();
    if closed > 0 {
        let noun = if closed == 1 { "document" } else { "documents" };
        lines.push(format!("Closed {closed} {noun}, {} open", session.len()));
    }
    lines
}

/// Runs the command loop until the session quits or input ends.
pub fn run(session: &mut Session, menu: &ConsoleMenu) -> anyhow::Result<()> {
    let defaults = session.config().search.flags();
    let mut events = EventHandler::new(session.subscribe());

    while !session.is_finished() {
        let Some(line) = prompt(&format!("{}> ", session.window_title())) else {
            tracing::info!("end of input");
            if !session.quit()? {
                tracing::warn!("leaving with unsaved changes");
            }
            break;
        };

        let input = match parse_line(&line, defaults) {
            Ok(input) => input,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let result = match input {
            Input::Run(command) => session.dispatch(command),
            Input::Select(start, end) => session
                .active_document_mut()
                .map(|doc| doc.set_selection(Selection::new(start, end))),
            Input::List => {
                print_list(session);
                Ok(())
            }
            Input::Show => {
                print_active(session);
                Ok(())
            }
            Input::Help => {
                print_help(menu);
                Ok(())
            }
            Input::Nothing => Ok(()),
        };

        // File errors were already shown by the session
        if let Err(e) = result {
            if !e.is_io() {
                println!("{e}");
            }
        }
        for line in status_lines(session, &events.drain()) {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Input {
        parse_line(line, SearchFlags::default()).unwrap()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("new"), Input::Run(Command::NewFile));
        assert_eq!(parse("closeall\n"), Input::Run(Command::CloseAll));
        assert_eq!(parse("   "), Input::Nothing);
        assert_eq!(parse("tab 2"), Input::Run(Command::Activate(1)));
        assert_eq!(parse("select 3 7"), Input::Select(3, 7));
    }

    #[test]
    fn test_parse_open() {
        assert_eq!(parse("open"), Input::Run(Command::OpenFile { path: None }));
        assert_eq!(
            parse("open notes/a b.txt"),
            Input::Run(Command::OpenFile {
                path: Some(PathBuf::from("notes/a b.txt"))
            })
        );
    }

    #[test]
    fn test_parse_type_keeps_spaces_and_escapes() {
        assert_eq!(
            parse("type  two words\\n"),
            Input::Run(Command::InsertText(" two words\n".to_string()))
        );
    }

    #[test]
    fn test_parse_find_flags() {
        let expected = SearchState::new("Foo bar").match_case(true).whole_word(true);
        assert_eq!(parse("find -c -w Foo bar"), Input::Run(Command::Find(expected)));

        let defaults = SearchFlags {
            match_case: true,
            whole_word: false,
        };
        let Input::Run(Command::Find(search)) = parse_line("find x", defaults).unwrap() else {
            panic!("expected find");
        };
        assert!(search.flags.match_case);
    }

    #[test]
    fn test_parse_replace() {
        let expected = SearchState::new("cat").with_replacement("dog");
        assert_eq!(
            parse("replaceall cat => dog"),
            Input::Run(Command::ReplaceAll(expected))
        );

        // Empty replacement deletes
        let Input::Run(Command::Replace(search)) = parse("replace x => ") else {
            panic!("expected replace");
        };
        assert_eq!(search.replacement, "");
    }

    #[test]
    fn test_parse_errors() {
        let flags = SearchFlags::default();
        assert_eq!(
            parse_line("frobnicate", flags),
            Err(ParseError::Unknown("frobnicate".to_string()))
        );
        assert!(matches!(parse_line("find", flags), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("replace cat", flags), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("select 1", flags), Err(ParseError::Usage(_))));
        assert_eq!(parse_line("tab 0", flags), Err(ParseError::Usage("tab <number>")));
        assert!(matches!(parse_line("tab two", flags), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("Y"), Answer::Yes);
        assert_eq!(parse_answer(" no "), Answer::No);
        assert_eq!(parse_answer("c"), Answer::Cancel);
        assert_eq!(parse_answer(""), Answer::Cancel);
    }

    #[test]
    fn test_status_lines_report_saves_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut session: Session = Session::new(
            Frontend::headless(),
            ted_core::Config::default(),
            ted_core::PersistedState::default(),
        );
        let mut events = EventHandler::new(session.subscribe());

        session.open(&path).unwrap();
        session.new_document();
        session.new_document();
        assert!(status_lines(&session, &events.drain()).is_empty());

        session.activate_index(0).unwrap();
        session.insert_text("!").unwrap();
        assert!(session.save_active().unwrap());
        let saved = std::fs::canonicalize(&path).unwrap();
        assert_eq!(
            status_lines(&session, &events.drain()),
            vec![format!("Saved {}", saved.display())]
        );

        // Both untitled documents are clean and close without asking
        session.dispatch(Command::CloseAll).unwrap();
        assert_eq!(
            status_lines(&session, &events.drain()),
            vec!["Closed 3 documents, 0 open".to_string()]
        );
    }

    #[test]
    fn test_console_menu_tracks_state() {
        let (mut frontend, menu) = frontend();
        frontend.menu.set_enabled(Action::Save, true);
        assert!(menu.is_enabled(Action::Save));
        assert!(!menu.is_enabled(Action::Undo));
    }
}
