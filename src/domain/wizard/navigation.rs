//! Undo stack for "go back".

use serde::{Deserialize, Serialize};

use super::state::AccumulatedState;
use super::step::Step;

/// Pre-transition copy of everything "go back" restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSnapshot {
    pub step: Step,
    pub state: AccumulatedState,
    pub step_index: u8,
    /// Log length before the answer that triggered the transition.
    pub conversation_length: usize,
}

/// Stack of snapshots, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationHistory {
    snapshots: Vec<NavigationSnapshot>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: NavigationSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<NavigationSnapshot> {
        self.snapshots.pop()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
