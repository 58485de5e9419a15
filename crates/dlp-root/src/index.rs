//! Id sets with O(1) insert, remove and membership.
//!
//! Backed by a dense vector plus an id-to-position map. Removal swaps the
//! last element into the freed slot, so iteration follows insertion order
//! until the first removal.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSet {
    ids: IndexSet<u64>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id`; returns false if it was already present
    pub fn insert(&mut self, id: u64) -> bool {
        self.ids.insert(id)
    }

    /// Remove `id`; returns false if it was absent
    pub fn remove(&mut self, id: u64) -> bool {
        self.ids.swap_remove(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Element at a dense position
    pub fn at(&self, position: usize) -> Option<u64> {
        self.ids.get_index(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }
}
