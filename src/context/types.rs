//! Shared context types: the `DataContext` seam, injected collaborators and a
//! plain map-backed context.

use crate::error::UpgradeAbort;
use crate::provider::{DataProvider, ProviderRegistry, Rule, RuleSet};
use crate::types::{DataKey, DataValue};
use crate::ui::{Affinity, EditorRegistry, HeadlessHost, NoEditors, UiHost};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Anything that can answer a key. Action contexts delegate unprotected keys
/// to a parent through this trait.
pub trait DataContext: Send + Sync {
    fn resolve_in(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort>;

    fn resolve(&self, key: &DataKey) -> Result<Option<DataValue>, UpgradeAbort> {
        self.resolve_in(key, Affinity::Background)
    }
}

/// External collaborators a context consults. Injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub rules: RuleSet,
    pub providers: ProviderRegistry,
    pub ui: Arc<dyn UiHost>,
    pub editors: Arc<dyn EditorRegistry>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            rules: RuleSet::new(),
            providers: ProviderRegistry::new(),
            ui: Arc::new(HeadlessHost),
            editors: Arc::new(NoEditors),
        }
    }
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.register(rule);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.providers.register(provider);
        self
    }

    pub fn ui(mut self, ui: Arc<dyn UiHost>) -> Self {
        self.ui = ui;
        self
    }

    pub fn editors(mut self, editors: Arc<dyn EditorRegistry>) -> Self {
        self.editors = editors;
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("rules", &self.rules)
            .field("providers", &self.providers)
            .finish_non_exhaustive()
    }
}

/// Context backed by a plain map; typically the root of a context chain.
#[derive(Debug, Default)]
pub struct MapDataContext {
    values: RwLock<HashMap<DataKey, DataValue>>,
}

impl MapDataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<DataKey>, value: DataValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&self, key: impl Into<DataKey>, value: DataValue) {
        self.values.write().insert(key.into(), value);
    }
}

impl DataContext for MapDataContext {
    fn resolve_in(
        &self,
        key: &DataKey,
        _affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        Ok(self.values.read().get(key).cloned())
    }
}
