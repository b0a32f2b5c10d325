//! Single-attribute index: value → slot offsets.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Maps one attribute's values to the offsets of slots holding them
#[derive(Debug, Clone)]
pub struct AttributeIndex<K> {
    entries: HashMap<K, BTreeSet<u64>>,
}

impl<K: Hash + Eq> AttributeIndex<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, offset: u64) {
        self.entries.entry(key).or_default().insert(offset);
    }

    /// Remove one offset; the key disappears with its last offset
    pub fn remove(&mut self, key: &K, offset: u64) {
        if let Some(offsets) = self.entries.get_mut(key) {
            offsets.remove(&offset);
            if offsets.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// Offsets for `key`, empty when the value is unknown
    pub fn get(&self, key: &K) -> BTreeSet<u64> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Hash + Eq> Default for AttributeIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
