//! Find and replace over a [`TextHandle`].
//!
//! Everything here is a free function over a buffer: no session or
//! document bookkeeping is touched, only the buffer's text and selection.
//!
//! ## Matching rules
//!
//! - Offsets are characters. Case-insensitive comparison lowercases one
//!   character at a time, so a match always spans exactly as many
//!   characters as the pattern.
//! - Whole-word matches must be bordered by non-word characters or the
//!   buffer edges. Word characters are alphanumerics and `_`.
//! - An empty pattern never matches and never mutates anything.
//!
//! ## Replace-all
//!
//! After replacing a match at `p` the scan resumes at `p + M`, right after
//! the inserted replacement. Resuming at `p` would rescan the replacement
//! (and loop forever when it contains the pattern); resuming at `p + L`
//! would skip text whenever `M < L`.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use ted_buffer::{BufferResult, Selection};

use crate::handle::TextHandle;

/// Matching options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFlags {
    /// Compare characters exactly instead of lowercased
    pub match_case: bool,
    /// Only accept matches bordered by non-word characters
    pub whole_word: bool,
}

/// Pattern, replacement and flags of an open find/replace flow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchState {
    pub pattern: String,
    pub replacement: String,
    pub flags: SearchFlags,
}

impl SearchState {
    /// Creates a search for `pattern` with default flags.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn match_case(mut self, on: bool) -> Self {
        self.flags.match_case = on;
        self
    }

    pub fn whole_word(mut self, on: bool) -> Self {
        self.flags.whole_word = on;
        self
    }
}

/// Outcome of a search that may wrap around once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapResult {
    /// Found between the start position and the end of the buffer
    FoundNoWrap(Range<usize>),
    /// Found only after restarting from the beginning
    FoundAfterWrap(Range<usize>),
    NotFound,
}

impl WrapResult {
    /// The matched range, if any.
    pub fn range(&self) -> Option<Range<usize>> {
        match self {
            WrapResult::FoundNoWrap(r) | WrapResult::FoundAfterWrap(r) => Some(r.clone()),
            WrapResult::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, WrapResult::NotFound)
    }

    /// Message to show the user, if this outcome warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            WrapResult::FoundNoWrap(_) => None,
            WrapResult::FoundAfterWrap(_) => Some("Search wrapped to the beginning of the document"),
            WrapResult::NotFound => Some("Text not found"),
        }
    }
}

/// Where an interactive find starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindMode {
    /// A fresh find: start at the caret
    Fresh,
    /// Find next: start after the current selection
    Next,
}

/// Outcome of an interactive replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Whether the selection was replaced
    pub replaced: bool,
    /// The following match (now selected), if any
    pub next: WrapResult,
}

/// Outcome of a replace-all pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceAllResult {
    /// Number of non-overlapping replacements performed
    pub count: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn chars_eq(a: char, b: char, match_case: bool) -> bool {
    a == b || (!match_case && a.to_lowercase().eq(b.to_lowercase()))
}

/// A compiled pattern.
struct Matcher {
    pattern: Vec<char>,
    flags: SearchFlags,
}

impl Matcher {
    /// `None` for an empty pattern.
    fn new(pattern: &str, flags: SearchFlags) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        Some(Self {
            pattern: pattern.chars().collect(),
            flags,
        })
    }

    fn len(&self) -> usize {
        self.pattern.len()
    }

    fn matches_at(&self, text: &[char], at: usize) -> bool {
        let end = at + self.len();
        if end > text.len() {
            return false;
        }
        let equal = text[at..end]
            .iter()
            .zip(&self.pattern)
            .all(|(&a, &b)| chars_eq(a, b, self.flags.match_case));
        if !equal {
            return false;
        }
        if self.flags.whole_word {
            let before_ok = at == 0 || !is_word_char(text[at - 1]);
            let after_ok = end == text.len() || !is_word_char(text[end]);
            return before_ok && after_ok;
        }
        true
    }

    /// First match whose start lies in `[from, limit)`.
    fn find_in(&self, text: &[char], from: usize, limit: usize) -> Option<Range<usize>> {
        if self.len() > text.len() {
            return None;
        }
        let last_start = (text.len() - self.len() + 1).min(limit);
        (from..last_start)
            .find(|&at| self.matches_at(text, at))
            .map(|at| at..at + self.len())
    }

    /// Whether the whole of `text` is the pattern under the case rule.
    fn equals(&self, text: &str) -> bool {
        let mut chars = text.chars();
        self.pattern
            .iter()
            .all(|&p| chars.next().is_some_and(|c| chars_eq(c, p, self.flags.match_case)))
            && chars.next().is_none()
    }
}

fn buffer_chars<B: TextHandle + ?Sized>(buffer: &B) -> Vec<char> {
    buffer.text().chars().collect()
}

/// Finds the first match starting at or after `start`.
pub fn find<B: TextHandle + ?Sized>(
    buffer: &B,
    pattern: &str,
    flags: SearchFlags,
    start: usize,
) -> Option<Range<usize>> {
    let matcher = Matcher::new(pattern, flags)?;
    matcher.find_in(&buffer_chars(buffer), start, usize::MAX)
}

/// Finds from `start` to the end, then once more from the beginning up to
/// `start`.
pub fn find_with_wrap<B: TextHandle + ?Sized>(
    buffer: &B,
    pattern: &str,
    flags: SearchFlags,
    start: usize,
) -> WrapResult {
    let Some(matcher) = Matcher::new(pattern, flags) else {
        return WrapResult::NotFound;
    };
    let text = buffer_chars(buffer);
    let start = start.min(text.len());

    if let Some(range) = matcher.find_in(&text, start, usize::MAX) {
        return WrapResult::FoundNoWrap(range);
    }
    if start > 0 {
        if let Some(range) = matcher.find_in(&text, 0, start) {
            return WrapResult::FoundAfterWrap(range);
        }
    }
    WrapResult::NotFound
}

/// Replaces `range` with `replacement` and selects the inserted text.
pub fn replace_one<B: TextHandle + ?Sized>(
    buffer: &mut B,
    range: Range<usize>,
    replacement: &str,
) -> BufferResult<Range<usize>> {
    let inserted = buffer.replace_range(range, replacement)?;
    buffer.set_selection(Selection::from(inserted.clone()));
    Ok(inserted)
}

/// Interactive find: selects the match on success, leaves the selection
/// alone when nothing is found.
pub fn find_or_advance<B: TextHandle + ?Sized>(
    buffer: &mut B,
    pattern: &str,
    flags: SearchFlags,
    mode: FindMode,
) -> WrapResult {
    let start = match mode {
        FindMode::Fresh => buffer.caret(),
        FindMode::Next => buffer.selection().end(),
    };
    let result = find_with_wrap(buffer, pattern, flags, start);
    if let Some(range) = result.range() {
        buffer.set_selection(Selection::from(range));
    }
    tracing::debug!(?mode, start, ?result, "find");
    result
}

/// Interactive replace.
///
/// If the selection holds `pattern` (under the case rule) it is replaced
/// and the next occurrence after the inserted text is selected. Otherwise
/// this is a fresh find and nothing is replaced.
pub fn replace_current_if_matches<B: TextHandle + ?Sized>(
    buffer: &mut B,
    pattern: &str,
    replacement: &str,
    flags: SearchFlags,
) -> BufferResult<ReplaceOutcome> {
    let Some(matcher) = Matcher::new(pattern, flags) else {
        return Ok(ReplaceOutcome {
            replaced: false,
            next: WrapResult::NotFound,
        });
    };

    let selection = buffer.selection();
    let selected_matches = !selection.is_empty()
        && buffer
            .text_range(selection.range())
            .is_some_and(|selected| matcher.equals(&selected));

    if !selected_matches {
        let next = find_or_advance(buffer, pattern, flags, FindMode::Fresh);
        return Ok(ReplaceOutcome {
            replaced: false,
            next,
        });
    }

    let inserted = replace_one(buffer, selection.range(), replacement)?;
    let next = find_with_wrap(buffer, pattern, flags, inserted.end);
    if let Some(range) = next.range() {
        buffer.set_selection(Selection::from(range));
    }
    Ok(ReplaceOutcome {
        replaced: true,
        next,
    })
}

/// Replaces every non-overlapping match, scanning from the start.
///
/// All replacements form a single undo step.
pub fn replace_all<B: TextHandle + ?Sized>(
    buffer: &mut B,
    pattern: &str,
    replacement: &str,
    flags: SearchFlags,
) -> BufferResult<ReplaceAllResult> {
    let Some(matcher) = Matcher::new(pattern, flags) else {
        return Ok(ReplaceAllResult::default());
    };

    // Mirror of the buffer, kept in step with every replacement
    let mut text = buffer_chars(buffer);
    let replacement_chars: Vec<char> = replacement.chars().collect();
    let mut count = 0;
    let mut pos = 0;

    buffer.begin_undo_group();
    let result = loop {
        let Some(range) = matcher.find_in(&text, pos, usize::MAX) else {
            break Ok(());
        };
        if let Err(e) = buffer.replace_range(range.clone(), replacement) {
            break Err(e);
        }
        text.splice(range.clone(), replacement_chars.iter().copied());
        count += 1;
        pos = range.start + replacement_chars.len();
    };
    buffer.end_undo_group();
    result?;

    tracing::debug!(pattern, count, "replace all");
    Ok(ReplaceAllResult { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ted_buffer::TextBuffer;

    const CASE: SearchFlags = SearchFlags {
        match_case: true,
        whole_word: false,
    };
    const NOCASE: SearchFlags = SearchFlags {
        match_case: false,
        whole_word: false,
    };

    #[test]
    fn test_find_respects_case_flag() {
        let buffer = TextBuffer::from("Hello hello");
        assert_eq!(find(&buffer, "hello", CASE, 0), Some(6..11));
        assert_eq!(find(&buffer, "hello", NOCASE, 0), Some(0..5));
    }

    #[test]
    fn test_find_from_start_position() {
        let buffer = TextBuffer::from("abcabc");
        assert_eq!(find(&buffer, "abc", CASE, 0), Some(0..3));
        assert_eq!(find(&buffer, "abc", CASE, 1), Some(3..6));
        assert_eq!(find(&buffer, "abc", CASE, 4), None);
    }

    #[test]
    fn test_find_whole_word() {
        let flags = SearchFlags {
            match_case: true,
            whole_word: true,
        };
        let buffer = TextBuffer::from("cat concat cat_x (cat)");
        assert_eq!(find(&buffer, "cat", flags, 0), Some(0..3));
        assert_eq!(find(&buffer, "cat", flags, 1), Some(18..21));
    }

    #[test]
    fn test_whole_word_looks_before_start() {
        let flags = SearchFlags {
            match_case: true,
            whole_word: true,
        };
        let buffer = TextBuffer::from("xfoo foo");
        // "foo" at 1 is preceded by 'x' even though the search starts there
        assert_eq!(find(&buffer, "foo", flags, 1), Some(5..8));
    }

    #[test]
    fn test_case_insensitive_counts_characters() {
        let buffer = TextBuffer::from("straße STRASSE İx");
        assert_eq!(find(&buffer, "STRAẞE", NOCASE, 0), Some(0..6));
        assert_eq!(find(&buffer, "strasse", NOCASE, 0), Some(7..14));
        assert_eq!(find(&buffer, "ix", NOCASE, 0), None);
        assert_eq!(find(&buffer, "İX", NOCASE, 0), Some(15..17));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let mut buffer = TextBuffer::from("abc");
        assert_eq!(find(&buffer, "", CASE, 0), None);
        assert_eq!(find_with_wrap(&buffer, "", CASE, 2), WrapResult::NotFound);
        assert_eq!(replace_all(&mut buffer, "", "x", CASE).unwrap().count, 0);
        assert_eq!(buffer.text(), "abc");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_wrap_finds_match_before_start() {
        let buffer = TextBuffer::from("needle in a haystack");
        let result = find_with_wrap(&buffer, "needle", CASE, 5);
        assert_eq!(result, WrapResult::FoundAfterWrap(0..6));
        assert!(result.notice().is_some());
    }

    #[test]
    fn test_match_at_start_is_not_a_wrap() {
        let buffer = TextBuffer::from("xx needle");
        assert_eq!(
            find_with_wrap(&buffer, "needle", CASE, 3),
            WrapResult::FoundNoWrap(3..9)
        );
    }

    #[test]
    fn test_wrap_not_found() {
        let buffer = TextBuffer::from("abc");
        assert_eq!(find_with_wrap(&buffer, "xyz", CASE, 2), WrapResult::NotFound);
        assert_eq!(find_with_wrap(&buffer, "xyz", CASE, 0), WrapResult::NotFound);
        assert_eq!(find_with_wrap(&buffer, "abc", CASE, 99), WrapResult::FoundAfterWrap(0..3));
    }

    #[test]
    fn test_not_found_leaves_selection() {
        let mut buffer = TextBuffer::from("abc");
        let result = find_or_advance(&mut buffer, "xyz", CASE, FindMode::Fresh);
        assert_eq!(result, WrapResult::NotFound);
        assert!(buffer.selection().is_empty());
        assert_eq!(buffer.caret(), 0);
    }

    #[test]
    fn test_fresh_find_starts_at_caret_next_after_selection() {
        let mut buffer = TextBuffer::from("ab ab ab");
        buffer.set_selection(Selection::new(3, 0));

        // Backward selection: caret at 0, selection ends at 3
        let fresh = find_or_advance(&mut buffer, "ab", CASE, FindMode::Fresh);
        assert_eq!(fresh, WrapResult::FoundNoWrap(0..2));

        buffer.set_selection(Selection::new(3, 0));
        let next = find_or_advance(&mut buffer, "ab", CASE, FindMode::Next);
        assert_eq!(next, WrapResult::FoundNoWrap(3..5));
        assert_eq!(buffer.selection().range(), 3..5);

        let next = find_or_advance(&mut buffer, "ab", CASE, FindMode::Next);
        assert_eq!(next, WrapResult::FoundNoWrap(6..8));
        let next = find_or_advance(&mut buffer, "ab", CASE, FindMode::Next);
        assert_eq!(next, WrapResult::FoundAfterWrap(0..2));
    }

    #[test]
    fn test_replace_one_selects_inserted_text() {
        let mut buffer = TextBuffer::from("hello world");
        let inserted = replace_one(&mut buffer, 6..11, "there!").unwrap();
        assert_eq!(inserted, 6..12);
        assert_eq!(buffer.text(), "hello there!");
        assert_eq!(buffer.selection().range(), 6..12);
    }

    #[test]
    fn test_replace_current_when_selection_matches() {
        let mut buffer = TextBuffer::from("Foo foo foo");
        buffer.set_selection(Selection::from(0..3));

        let outcome = replace_current_if_matches(&mut buffer, "foo", "bar", NOCASE).unwrap();
        assert!(outcome.replaced);
        assert_eq!(outcome.next, WrapResult::FoundNoWrap(4..7));
        assert_eq!(buffer.text(), "bar foo foo");
        assert_eq!(buffer.selection().range(), 4..7);
    }

    #[test]
    fn test_replace_with_mismatched_selection_only_finds() {
        let mut buffer = TextBuffer::from("Foo foo");
        buffer.set_selection(Selection::from(0..3));

        let outcome = replace_current_if_matches(&mut buffer, "foo", "bar", CASE).unwrap();
        assert!(!outcome.replaced);
        assert_eq!(outcome.next, WrapResult::FoundNoWrap(4..7));
        assert_eq!(buffer.text(), "Foo foo");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_replace_without_selection_finds_first() {
        let mut buffer = TextBuffer::from("one two one");
        let outcome = replace_current_if_matches(&mut buffer, "one", "1", CASE).unwrap();
        assert!(!outcome.replaced);
        assert_eq!(buffer.selection().range(), 0..3);

        let outcome = replace_current_if_matches(&mut buffer, "one", "1", CASE).unwrap();
        assert!(outcome.replaced);
        assert_eq!(outcome.next, WrapResult::FoundNoWrap(6..9));

        let outcome = replace_current_if_matches(&mut buffer, "one", "1", CASE).unwrap();
        assert!(outcome.replaced);
        assert_eq!(outcome.next, WrapResult::NotFound);
        assert_eq!(buffer.text(), "1 two 1");
        assert_eq!(buffer.selection().range(), 6..7);
    }

    #[test]
    fn test_replace_all_concrete() {
        let mut buffer = TextBuffer::from("foo bar foo");
        let result = replace_all(&mut buffer, "foo", "baz", CASE).unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(buffer.text(), "baz bar baz");
    }

    #[test]
    fn test_replace_all_replacement_contains_pattern() {
        let mut buffer = TextBuffer::from("aaa");
        let result = replace_all(&mut buffer, "a", "aa", CASE).unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(buffer.text(), "aaaaaa");
    }

    #[test]
    fn test_replace_all_with_empty_replacement() {
        let mut buffer = TextBuffer::from("a-b-c-");
        let result = replace_all(&mut buffer, "-", "", CASE).unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_replace_all_is_one_undo_step() {
        let mut buffer = TextBuffer::from("x.x.x");
        replace_all(&mut buffer, "x", "yy", CASE).unwrap();
        assert_eq!(buffer.text(), "yy.yy.yy");

        buffer.undo().unwrap();
        assert_eq!(buffer.text(), "x.x.x");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_replace_all_no_match_leaves_clean() {
        let mut buffer = TextBuffer::from("abc");
        let result = replace_all(&mut buffer, "z", "y", CASE).unwrap();
        assert_eq!(result.count, 0);
        assert!(!buffer.is_modified());
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_replace_all_whole_word() {
        let flags = SearchFlags {
            match_case: false,
            whole_word: true,
        };
        let mut buffer = TextBuffer::from("It it item IT");
        let result = replace_all(&mut buffer, "it", "x", flags).unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(buffer.text(), "x x item x");
    }

    proptest! {
        #[test]
        fn replace_all_counts_every_occurrence(
            text in "[ab ]{0,40}",
            pattern in "[ab]{1,3}",
            replacement in "[ab]{0,4}",
        ) {
            let mut buffer = TextBuffer::from(text.as_str());
            let expected = text.matches(pattern.as_str()).count();

            let result = replace_all(&mut buffer, &pattern, &replacement, CASE).unwrap();

            prop_assert_eq!(result.count, expected);
            prop_assert_eq!(buffer.text().into_owned(), text.replace(pattern.as_str(), &replacement));
        }
    }
}
