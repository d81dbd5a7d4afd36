//! Per-context memo of resolved keys.

use crate::types::{DataKey, DataValue};
use dashmap::DashMap;

/// Write-once cache. A missing entry means "not attempted yet"; an entry of
/// `None` means "resolved, and there is no data".
#[derive(Debug, Default)]
pub struct DataCache {
    entries: DashMap<DataKey, Option<DataValue>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DataKey) -> Option<Option<DataValue>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `value` unless another resolution got there first; returns the stored entry.
    pub fn insert_once(&self, key: DataKey, value: Option<DataValue>) -> Option<DataValue> {
        self.entries.entry(key).or_insert(value).value().clone()
    }

    pub fn contains(&self, key: &DataKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
