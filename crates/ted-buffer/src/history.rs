//! Undo/redo history management.
//!
//! ## The Command Pattern
//!
//! Each edit is stored as a command that can be:
//! - Executed (applied to the buffer)
//! - Undone (reversed)
//! - Redone (re-applied after undo)
//!
//! Edits are collected into [`EditGroup`]s. A group is the unit of undo:
//! rapid adjacent keystrokes coalesce into one group, and callers can open
//! an explicit group so that a compound operation (a replacement, or a
//! whole replace-all pass) undoes in one step.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// The type of edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Character position where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    /// Creates an insert edit.
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    /// Creates a delete edit.
    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Returns the inverse of this edit (for undo).
    pub fn inverse(&self) -> Self {
        Self {
            kind: match self.kind {
                EditKind::Insert => EditKind::Delete,
                EditKind::Delete => EditKind::Insert,
            },
            position: self.position,
            content: self.content.clone(),
        }
    }

    /// Length of the edited text in characters.
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if this edit can be coalesced with another.
    ///
    /// Two edits can be coalesced if:
    /// - They're the same kind
    /// - They're adjacent (next character for insert, same position for delete)
    /// - Neither is a newline
    pub fn can_coalesce(&self, other: &Edit) -> bool {
        if self.kind != other.kind {
            return false;
        }

        if self.content.contains('\n') || other.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.position + self.len_chars() == other.position,
            EditKind::Delete => {
                // Backspace lands just before us, forward delete at the same spot
                other.position + other.len_chars() == self.position
                    || self.position == other.position
            }
        }
    }

    /// Coalesces another edit into this one.
    pub fn coalesce(&mut self, other: Edit) {
        match self.kind {
            EditKind::Insert => {
                self.content.push_str(&other.content);
            }
            EditKind::Delete => {
                if other.position < self.position {
                    self.content = other.content + &self.content;
                    self.position = other.position;
                } else {
                    self.content.push_str(&other.content);
                }
            }
        }
    }
}

/// A group of edits that are undone/redone together.
///
/// Edits are stored in the order they were applied.
#[derive(Debug, Clone)]
pub struct EditGroup {
    /// The edits in this group
    pub edits: Vec<Edit>,
    /// When this group was last extended (`None` disables coalescing)
    pub timestamp: Option<Instant>,
}

impl EditGroup {
    /// Creates a new edit group.
    pub fn new(edit: Edit) -> Self {
        Self {
            edits: vec![edit],
            timestamp: Some(Instant::now()),
        }
    }

    /// Adds an edit to this group.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
        self.timestamp = Some(Instant::now());
    }

    /// Returns a mutable reference to the last edit.
    pub fn last_mut(&mut self) -> Option<&mut Edit> {
        self.edits.last_mut()
    }
}

/// Manages undo/redo history.
///
/// Bounded: once `max_size` groups are stored the oldest are dropped.
///
/// Explicit groups nest. Only the outermost `begin_group` starts a new
/// group; every edit pushed until the matching outermost `end_group`
/// lands in it.
///
/// The save point is the undo depth at which the content matched the file
/// on disk. Undoing or redoing back to it makes the buffer clean again.
#[derive(Debug, Clone)]
pub struct History {
    /// Stack of undoable edit groups
    undo_stack: VecDeque<EditGroup>,
    /// Stack of redoable edit groups
    redo_stack: Vec<EditGroup>,
    /// Maximum number of edit groups to keep
    max_size: usize,
    /// Time threshold for coalescing edits
    coalesce_threshold: Duration,
    /// Nesting depth of explicit groups
    group_depth: usize,
    /// Whether the current explicit group already has its first edit
    group_started: bool,
    /// Undo depth matching the last load/save; `None` once unreachable
    save_point: Option<usize>,
}

impl History {
    /// Creates a new history with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(1024)),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            coalesce_threshold: Duration::from_millis(300),
            group_depth: 0,
            group_started: false,
            save_point: Some(0),
        }
    }

    /// Pushes an edit onto the history.
    ///
    /// Clears the redo stack. Outside an explicit group the edit may
    /// coalesce with the previous one.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();
        // A save point inside the discarded redo stack is gone for good
        if self.save_point.is_some_and(|p| p > self.undo_stack.len()) {
            self.save_point = None;
        }

        if self.group_depth > 0 {
            if self.group_started {
                if self.at_save_point() {
                    self.save_point = None;
                }
                if let Some(group) = self.undo_stack.back_mut() {
                    group.edits.push(edit);
                    return;
                }
            }
            self.group_started = true;
            let mut group = EditGroup::new(edit);
            // Explicit groups never absorb later keystrokes
            group.timestamp = None;
            self.push_group(group);
            return;
        }

        if let Some(last_group) = self.undo_stack.back_mut() {
            if let Some(timestamp) = last_group.timestamp {
                if timestamp.elapsed() < self.coalesce_threshold {
                    if let Some(last_edit) = last_group.last_mut() {
                        if last_edit.can_coalesce(&edit) {
                            last_edit.coalesce(edit);
                            last_group.timestamp = Some(Instant::now());
                            return;
                        }
                    }
                }
            }
        }

        self.push_group(EditGroup::new(edit));
    }

    fn push_group(&mut self, group: EditGroup) {
        self.undo_stack.push_back(group);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
            self.save_point = match self.save_point {
                Some(p) if p > 0 => Some(p - 1),
                _ => None,
            };
        }
    }

    /// Records the current depth as matching the file on disk.
    ///
    /// The top group stops coalescing, so the next keystroke starts a new
    /// undo step instead of extending the saved one.
    pub fn mark_save_point(&mut self) {
        if let Some(group) = self.undo_stack.back_mut() {
            group.timestamp = None;
        }
        self.save_point = Some(self.undo_stack.len());
    }

    /// Returns true if undo/redo has returned to the last save point.
    pub fn at_save_point(&self) -> bool {
        self.save_point == Some(self.undo_stack.len())
    }

    /// Starts an edit group.
    ///
    /// All edits until the matching `end_group()` form one undo step.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.group_started = false;
        }
        self.group_depth += 1;
    }

    /// Ends the current edit group.
    pub fn end_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.group_started = false;
        }
    }

    /// Returns true while an explicit group is open.
    pub fn in_group(&self) -> bool {
        self.group_depth > 0
    }

    /// Pops the last group for undo.
    ///
    /// The returned edits are in application order; the caller reverses
    /// them back to front.
    pub fn undo(&mut self) -> Option<EditGroup> {
        let mut group = self.undo_stack.pop_back()?;
        group.timestamp = None;
        self.redo_stack.push(group.clone());
        Some(group)
    }

    /// Pops the last undone group for redo.
    pub fn redo(&mut self) -> Option<EditGroup> {
        let group = self.redo_stack.pop()?;
        // No timestamp prevents coalescing with the next keystroke
        self.push_group(EditGroup {
            edits: group.edits.clone(),
            timestamp: None,
        });
        Some(group)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_depth = 0;
        self.group_started = false;
        self.save_point = Some(0);
    }

    /// Returns the number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
