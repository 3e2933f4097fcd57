//! Snapshot history - bounded ring buffer, oldest evicted first

use std::collections::VecDeque;

use crate::board::Board;
use crate::snapshot::BoardSnapshot;
use crate::types::HISTORY_CAPACITY;

#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: VecDeque<BoardSnapshot>,
    capacity: usize,
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn add_snapshot(&mut self, snapshot: BoardSnapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn take_snapshot(&mut self, board: &Board) {
        self.add_snapshot(BoardSnapshot::from_board(board));
    }

    /// Snapshot at `index`, oldest first
    pub fn get(&self, index: usize) -> Option<&BoardSnapshot> {
        self.snapshots.get(index)
    }

    pub fn latest(&self) -> Option<&BoardSnapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Copies of every snapshot, oldest first
    pub fn all(&self) -> Vec<BoardSnapshot> {
        self.snapshots.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Pretty-printed JSON array of every snapshot
    pub fn export_history(&self) -> serde_json::Result<String> {
        let snapshots: Vec<&BoardSnapshot> = self.snapshots.iter().collect();
        serde_json::to_string_pretty(&snapshots)
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
