//! Timestamps and timestamp sets.
//!
//! A timestamp is a causal marker for one key's value. The request-time set is
//! captured when the action is triggered on the client; the actual-time set is
//! captured when the host executes it. Keys missing from the request-time set
//! are not protected against staleness at all.

use crate::types::{DataKey, DataValue};
use crate::upgrade::UpgradableTimestamp;
use std::collections::HashMap;
use std::sync::Arc;

/// Causal marker for one key's value. Immutable once built.
#[derive(Debug, Clone)]
pub enum Timestamp {
    /// Value is already current (or currency does not matter for it).
    Plain(Option<DataValue>),
    /// Value must be reconciled against the actual-time set before it is trusted.
    Upgradable(Arc<dyn UpgradableTimestamp>),
}

impl Timestamp {
    pub fn plain(value: DataValue) -> Self {
        Timestamp::Plain(Some(value))
    }

    /// A plain timestamp whose data is explicitly absent.
    pub fn absent() -> Self {
        Timestamp::Plain(None)
    }

    pub fn upgradable<U: UpgradableTimestamp + 'static>(timestamp: U) -> Self {
        Timestamp::Upgradable(Arc::new(timestamp))
    }

    pub fn is_upgradable(&self) -> bool {
        matches!(self, Timestamp::Upgradable(_))
    }

    pub fn data(&self) -> Option<DataValue> {
        match self {
            Timestamp::Plain(data) => data.clone(),
            Timestamp::Upgradable(timestamp) => timestamp.data(),
        }
    }
}

/// Mapping from key to timestamp for one point in time.
#[derive(Debug, Clone, Default)]
pub struct TimestampSet {
    timestamps: HashMap<DataKey, Timestamp>,
}

impl TimestampSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<DataKey>, timestamp: Timestamp) -> Self {
        self.insert(key, timestamp);
        self
    }

    pub fn insert(&mut self, key: impl Into<DataKey>, timestamp: Timestamp) {
        self.timestamps.insert(key.into(), timestamp);
    }

    pub fn get(&self, key: &DataKey) -> Option<&Timestamp> {
        self.timestamps.get(key)
    }

    pub fn contains(&self, key: &DataKey) -> bool {
        self.timestamps.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DataKey> {
        self.timestamps.keys()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl FromIterator<(DataKey, Timestamp)> for TimestampSet {
    fn from_iter<I: IntoIterator<Item = (DataKey, Timestamp)>>(iter: I) -> Self {
        Self {
            timestamps: iter.into_iter().collect(),
        }
    }
}
