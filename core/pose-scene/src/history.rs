//! Snapshot-based undo/redo stacks
//!
//! ```text
//! push(s0), push(s1)        undo()                    push(s2)
//! undo: [s0, s1]            undo: [s0]                undo: [s0, s2']
//! redo: []                  redo: [current]           redo: []
//! ```
//!
//! History is linear: pushing a new snapshot discards every redo entry.

use std::collections::VecDeque;

use log::debug;

use crate::snapshot::SceneSnapshot;

/// Configuration for the history stacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots; `None` keeps every snapshot
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    /// Keep every snapshot
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    /// Keep at most `max_depth` undo snapshots, evicting the oldest
    pub fn bounded(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// Undo and redo stacks of scene snapshots
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: VecDeque<SceneSnapshot>,
    redo_stack: Vec<SceneSnapshot>,
    config: HistoryConfig,
}

impl History {
    /// Create empty stacks
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            config,
        }
    }

    /// Record the state before an edit and drop the redo branch
    pub fn push(&mut self, snapshot: SceneSnapshot) {
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot);
        self.enforce_depth();
    }

    /// Step back: `current` moves to the redo stack and the previous state
    /// is returned for restoring
    pub fn undo(&mut self, current: SceneSnapshot) -> Option<SceneSnapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        debug!(
            "Undo (undo depth {}, redo depth {})",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Some(previous)
    }

    /// Step forward: `current` moves back to the undo stack and the
    /// undone state is returned for restoring
    pub fn redo(&mut self, current: SceneSnapshot) -> Option<SceneSnapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        self.enforce_depth();
        debug!(
            "Redo (undo depth {}, redo depth {})",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    fn enforce_depth(&mut self) {
        if let Some(max_depth) = self.config.max_depth {
            while self.undo_stack.len() > max_depth {
                self.undo_stack.pop_front();
            }
        }
    }
}
