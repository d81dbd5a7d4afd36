//! Data Provider Abstraction
//!
//! Pluggable suppliers of key → value mappings. Providers are injected as an
//! ordered list at context construction; each one is independently fallible
//! and is always invoked behind an isolating guard so that one broken source
//! cannot disturb an unrelated lookup.

use crate::error::{SourceError, UpgradeAbort};
use crate::types::{DataKey, DataValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

pub mod rules;

pub use rules::{Rule, RuleKind, RuleSet};

/// Result of asking a single rule or provider.
pub type SourceResult = Result<Option<DataValue>, SourceError>;

/// Resolver handed to rules and providers so they can ask for other keys.
pub trait DataLookup {
    fn lookup(&self, key: &DataKey) -> Result<Option<DataValue>, UpgradeAbort>;
}

impl<F> DataLookup for F
where
    F: Fn(&DataKey) -> Result<Option<DataValue>, UpgradeAbort>,
{
    fn lookup(&self, key: &DataKey) -> Result<Option<DataValue>, UpgradeAbort> {
        self(key)
    }
}

/// A pluggable supplier of data.
pub trait DataProvider: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Answer `key`, optionally consulting `lookup` for other keys.
    fn get_data(&self, key: &DataKey, lookup: &dyn DataLookup) -> SourceResult;
}

/// Run one source behind the isolating guard.
///
/// A [`SourceError::Failed`] is logged and folded into "no data"; an abort
/// raised by the chain underneath the source passes through untouched.
pub fn guarded<F>(source: &str, key: &DataKey, call: F) -> Result<Option<DataValue>, UpgradeAbort>
where
    F: FnOnce() -> SourceResult,
{
    match call() {
        Ok(Some(value)) => Ok(Some(value)),
        Ok(None) => {
            trace!(source, key = %key, "Source has no data");
            Ok(None)
        }
        Err(SourceError::Failed(message)) => {
            warn!(source, key = %key, error = %message, "Data source failed; treating as no data");
            Ok(None)
        }
        Err(SourceError::Abort(abort)) => Err(abort),
    }
}

/// Adapts a provider into a [`DataLookup`] that always goes through the guard.
pub(crate) struct GuardedProvider<'a> {
    pub provider: &'a dyn DataProvider,
    pub chain: &'a dyn DataLookup,
}

impl DataLookup for GuardedProvider<'_> {
    fn lookup(&self, key: &DataKey) -> Result<Option<DataValue>, UpgradeAbort> {
        guarded(self.provider.name(), key, || {
            self.provider.get_data(key, self.chain)
        })
    }
}

/// Ordered list of providers consulted by a context.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn DataProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; registration order is consultation order.
    pub fn register(&mut self, provider: Arc<dyn DataProvider>) {
        self.providers.push(provider);
    }

    pub fn with(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DataProvider>> {
        self.providers.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Provider backed by a fixed map.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    values: HashMap<DataKey, DataValue>,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<DataKey>, value: DataValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_data(&self, key: &DataKey, _lookup: &dyn DataLookup) -> SourceResult {
        Ok(self.values.get(key).cloned())
    }
}

type ProviderFn = dyn Fn(&DataKey, &dyn DataLookup) -> SourceResult + Send + Sync;

/// Provider backed by a closure.
pub struct FnProvider {
    name: String,
    call: Box<ProviderFn>,
}

impl FnProvider {
    pub fn new<F>(name: impl Into<String>, call: F) -> Self
    where
        F: Fn(&DataKey, &dyn DataLookup) -> SourceResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            call: Box::new(call),
        }
    }
}

impl DataProvider for FnProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_data(&self, key: &DataKey, lookup: &dyn DataLookup) -> SourceResult {
        (self.call)(key, lookup)
    }
}

/// Provider that fails for a fixed set of keys (or every key when the set is empty).
#[derive(Debug, Clone)]
pub struct FailingProvider {
    name: String,
    keys: Vec<DataKey>,
    message: String,
}

impl FailingProvider {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
            message: message.into(),
        }
    }

    pub fn for_keys(mut self, keys: impl IntoIterator<Item = DataKey>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }
}

impl DataProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_data(&self, key: &DataKey, _lookup: &dyn DataLookup) -> SourceResult {
        if self.keys.is_empty() || self.keys.contains(key) {
            Err(SourceError::failed(self.message.clone()))
        } else {
            Ok(None)
        }
    }
}
