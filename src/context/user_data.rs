//! Side-channel key/value cell that collaborators use to stash per-context
//! metadata.
//!
//! Readers load the current immutable snapshot; writers build the next
//! snapshot and publish it with compare-and-swap, retrying from the fresh
//! snapshot when another writer won. No update is ever lost.

use crate::types::DataValue;
use arc_swap::ArcSwap;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Snapshot = im::HashMap<&'static str, DataValue>;

/// Typed key into a [`UserDataStore`]. Keys are identified by name.
pub struct UserDataKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> UserDataKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for UserDataKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for UserDataKey<T> {}

impl<T> fmt::Debug for UserDataKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserDataKey").field(&self.name).finish()
    }
}

pub struct UserDataStore {
    snapshot: ArcSwap<Snapshot>,
}

impl Default for UserDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDataStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::new()),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &UserDataKey<T>) -> Option<Arc<T>> {
        self.snapshot
            .load()
            .get(&key.name)
            .and_then(|value| value.downcast_arc::<T>())
    }

    /// Associate `value` with `key`, or remove the key when `value` is `None`.
    pub fn put<T: Any + Send + Sync>(&self, key: &UserDataKey<T>, value: Option<T>) {
        self.put_value(key.name, value.map(DataValue::new));
    }

    fn put_value(&self, name: &'static str, value: Option<DataValue>) {
        loop {
            let current = self.snapshot.load();
            let next = match &value {
                None if !current.contains_key(&name) => return,
                None => current.without(&name),
                Some(value) => current.update(name, value.clone()),
            };
            let previous = self.snapshot.compare_and_swap(&*current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &*current) {
                return;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}

impl fmt::Debug for UserDataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot.load();
        let mut names: Vec<&str> = snapshot.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("UserDataStore").field("keys", &names).finish()
    }
}
