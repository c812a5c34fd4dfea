use serde::{Deserialize, Serialize};

use crate::model::config::DEFAULT_UNDO_LIMIT;
use crate::model::topic::Topic;

/// Bounded stack of full-tree snapshots, oldest first.
///
/// Each snapshot is a deep copy of the topic list taken just before a move.
/// Undo replaces the whole tree with the most recent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStack {
    #[serde(skip, default = "default_limit")]
    limit: usize,
    #[serde(default)]
    snapshots: Vec<Vec<Topic>>,
}

fn default_limit() -> usize {
    DEFAULT_UNDO_LIMIT
}

impl Default for UndoStack {
    fn default() -> Self {
        UndoStack::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoStack {
    pub fn new(limit: usize) -> Self {
        UndoStack {
            limit,
            snapshots: Vec::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, dropping the oldest snapshots if the stack is now too long.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Push a snapshot. The oldest snapshots fall off once the limit is exceeded.
    pub fn push(&mut self, snapshot: Vec<Topic>) {
        self.snapshots.push(snapshot);
        self.enforce_limit();
    }

    /// Pop the most recent snapshot
    pub fn pop(&mut self) -> Option<Vec<Topic>> {
        self.snapshots.pop()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    fn enforce_limit(&mut self) {
        if self.snapshots.len() > self.limit {
            self.snapshots.drain(..self.snapshots.len() - self.limit);
        }
    }
}

/// Restore the tree to the most recent snapshot.
/// Returns false (and leaves `topics` alone) when there is nothing to undo.
pub fn undo(topics: &mut Vec<Topic>, history: &mut UndoStack) -> bool {
    match history.pop() {
        Some(previous) => {
            *topics = previous;
            tracing::debug!(remaining = history.len(), "undo restored snapshot");
            true
        }
        None => false,
    }
}
