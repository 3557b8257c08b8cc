//! Bounded undo history.

use std::collections::VecDeque;

use engine_core::{Direction, MoveTranscript, Tile};

/// State restored by an undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tiles: Vec<Tile>,
    pub score: u64,
    pub transcript: MoveTranscript,
    pub moves: Vec<Direction>,
}

/// Ring of the most recent snapshots, oldest evicted first.
///
/// A capacity of 0 disables undo.
#[derive(Debug, Clone)]
pub struct UndoHistory<T> {
    slots: VecDeque<T>,
    capacity: usize,
}

impl<T> UndoHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() == self.capacity {
            self.slots.pop_front();
        }
        self.slots.push_back(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.slots.pop_back()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
