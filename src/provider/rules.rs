//! Inference rules: synthesize a value for one key from other keys.
//!
//! Provider-kind rules wrap every individual source (the self/parent chain,
//! each provider, each component provider) and only see that source as their
//! base. Context-kind rules run once, after every source came up empty, and
//! see the whole context as their base.

use super::{guarded, DataLookup, SourceResult};
use crate::error::UpgradeAbort;
use crate::types::{DataKey, DataValue};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Provider,
    Context,
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> RuleKind {
        RuleKind::Provider
    }

    fn get_data(&self, key: &DataKey, base: &dyn DataLookup) -> SourceResult;
}

/// Injected, ordered rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn with(mut self, rule: Arc<dyn Rule>) -> Self {
        self.register(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ask every rule of `kind` in order; first value wins.
    pub fn apply(
        &self,
        kind: RuleKind,
        key: &DataKey,
        base: &dyn DataLookup,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        for rule in self.rules.iter().filter(|r| r.kind() == kind) {
            if let Some(value) = guarded(rule.name(), key, || rule.get_data(key, base))? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Ask `source` directly, then the provider-kind rules over it.
    pub fn provider_and_rules(
        &self,
        key: &DataKey,
        source: &dyn DataLookup,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        if let Some(value) = source.lookup(key)? {
            return Ok(Some(value));
        }
        self.apply(RuleKind::Provider, key, source)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.name()).collect();
        f.debug_struct("RuleSet").field("rules", &names).finish()
    }
}

type RuleFn = dyn Fn(&DataKey, &dyn DataLookup) -> SourceResult + Send + Sync;

/// Rule backed by a closure.
pub struct FnRule {
    name: String,
    kind: RuleKind,
    call: Box<RuleFn>,
}

impl FnRule {
    pub fn new<F>(name: impl Into<String>, kind: RuleKind, call: F) -> Self
    where
        F: Fn(&DataKey, &dyn DataLookup) -> SourceResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            call: Box::new(call),
        }
    }
}

impl Rule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RuleKind {
        self.kind
    }

    fn get_data(&self, key: &DataKey, base: &dyn DataLookup) -> SourceResult {
        (self.call)(key, base)
    }
}

/// Answers `key` with whatever the base resolver holds for `from`.
#[derive(Debug, Clone)]
pub struct AliasRule {
    key: DataKey,
    from: DataKey,
    kind: RuleKind,
}

impl AliasRule {
    pub fn new(key: impl Into<DataKey>, from: impl Into<DataKey>, kind: RuleKind) -> Self {
        Self {
            key: key.into(),
            from: from.into(),
            kind,
        }
    }
}

impl Rule for AliasRule {
    fn name(&self) -> &str {
        "alias"
    }

    fn kind(&self) -> RuleKind {
        self.kind
    }

    fn get_data(&self, key: &DataKey, base: &dyn DataLookup) -> SourceResult {
        if key != &self.key || self.from == self.key {
            return Ok(None);
        }
        Ok(base.lookup(&self.from)?)
    }
}
