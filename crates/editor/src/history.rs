//! Undo/redo over full project snapshots
//!
//! Callers snapshot the project with [`History::save_state`] *before* each
//! logical edit. Snapshots are owned deep copies, so later edits to the
//! live project can never reach into a stored one.

use floorgraph_ir::Project;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// A frozen copy of the project and the action it preceded
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    /// Description of the action
    pub action: String,
    project: Project,
}

impl HistorySnapshot {
    /// Capture a deep copy of `project`
    pub fn new(action: impl Into<String>, project: &Project) -> Self {
        Self {
            action: action.into(),
            project: project.clone(),
        }
    }

    /// The captured project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// A fresh copy of the captured project
    pub fn restore(&self) -> Project {
        self.project.clone()
    }
}

/// Where the live project sits relative to the stored snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Live state is newer than every snapshot
    Tip,
    /// Live state equals `entries[i]`
    At(usize),
}

/// Bounded, linear undo/redo history
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistorySnapshot>,
    cursor: Cursor,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Create a history with the default capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history keeping at most `capacity` snapshots (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: Cursor::Tip,
            capacity: capacity.max(1),
        }
    }

    /// Snapshot `project` before an edit.
    ///
    /// Discards any redo states. Skipped when the project equals the most
    /// recent snapshot. Returns whether a snapshot was stored.
    pub fn save_state(&mut self, action: impl Into<String>, project: &Project) -> bool {
        if let Cursor::At(index) = self.cursor {
            let dropped = self.entries.len() - (index + 1);
            if dropped > 0 {
                tracing::debug!("Discarding {} redo state(s)", dropped);
            }
            self.entries.truncate(index + 1);
        }
        self.cursor = Cursor::Tip;

        let action = action.into();
        if self.entries.last().is_some_and(|last| &last.project == project) {
            tracing::debug!("Skipped snapshot for '{}': nothing changed", action);
            return false;
        }
        self.push(HistorySnapshot::new(action, project));
        true
    }

    fn push(&mut self, snapshot: HistorySnapshot) {
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.remove(0);
            tracing::debug!("History full, evicted '{}'", evicted.action);
        }
    }

    /// Step back. `live` is the current project, kept so that redo can
    /// return to it. Returns the project to restore, or `None` when there
    /// is nothing older.
    pub fn undo(&mut self, live: &Project) -> Option<Project> {
        let index = match self.cursor {
            Cursor::At(index) => index,
            Cursor::Tip => {
                if self.entries.is_empty() {
                    return None;
                }
                if self.entries.last().is_some_and(|last| &last.project != live) {
                    self.push(HistorySnapshot::new("current", live));
                }
                self.entries.len() - 1
            }
        };
        self.cursor = Cursor::At(index);

        if index == 0 {
            return None;
        }
        self.cursor = Cursor::At(index - 1);
        let snapshot = &self.entries[index - 1];
        tracing::debug!("Undo to before '{}'", snapshot.action);
        Some(snapshot.restore())
    }

    /// Step forward. Returns the project to restore, or `None` when already
    /// at the newest state.
    pub fn redo(&mut self) -> Option<Project> {
        let Cursor::At(index) = self.cursor else {
            return None;
        };
        let next = self.entries.get(index + 1)?;
        self.cursor = Cursor::At(index + 1);
        tracing::debug!("Redo '{}'", self.entries[index].action);
        Some(next.restore())
    }

    /// Drop the newest snapshot if it equals `live`.
    ///
    /// Call after an edit that may have changed nothing, so the snapshot
    /// taken before it does not leave an undo step that restores the same
    /// state. Only acts at the tip. Returns whether a snapshot was dropped.
    pub fn discard_unchanged(&mut self, live: &Project) -> bool {
        if self.cursor != Cursor::Tip {
            return false;
        }
        match self.entries.last() {
            Some(last) if &last.project == live => {
                tracing::debug!("Dropped snapshot for '{}': edit changed nothing", last.action);
                self.entries.pop();
                true
            }
            _ => false,
        }
    }

    /// Check if undo is available.
    ///
    /// At the tip this assumes the newest snapshot differs from the live
    /// project, which holds as long as no-op edits are followed by
    /// [`History::discard_unchanged`].
    pub fn can_undo(&self) -> bool {
        match self.cursor {
            Cursor::Tip => !self.entries.is_empty(),
            Cursor::At(index) => index > 0,
        }
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Cursor::Tip => false,
            Cursor::At(index) => index + 1 < self.entries.len(),
        }
    }

    /// Label of the action the next undo reverts
    pub fn undo_action(&self) -> Option<&str> {
        let index = match self.cursor {
            Cursor::Tip => self.entries.len().checked_sub(1)?,
            Cursor::At(index) => index.checked_sub(1)?,
        };
        self.entries.get(index).map(|s| s.action.as_str())
    }

    /// Label of the action the next redo re-applies
    pub fn redo_action(&self) -> Option<&str> {
        match self.cursor {
            Cursor::Tip => None,
            Cursor::At(index) if index + 1 < self.entries.len() => {
                Some(self.entries[index].action.as_str())
            }
            Cursor::At(_) => None,
        }
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = Cursor::Tip;
    }

    /// Get undo stack size
    pub fn undo_count(&self) -> usize {
        match self.cursor {
            Cursor::Tip => self.entries.len(),
            Cursor::At(index) => index,
        }
    }

    /// Get redo stack size
    pub fn redo_count(&self) -> usize {
        match self.cursor {
            Cursor::Tip => 0,
            Cursor::At(index) => self.entries.len() - index - 1,
        }
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored snapshots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored snapshots, oldest first
    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.entries
    }
}

// ============================================================================
// Tests
// ============================================================================
