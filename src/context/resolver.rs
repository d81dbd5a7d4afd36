//! Action data context: one resolution episode per action invocation.
//!
//! `resolve` consults, in order:
//! 1. the memo cache;
//! 2. the self/parent chain (request-time timestamps, upgraded when needed,
//!    then the parent) followed by provider-kind rules over it;
//! 3. the injected providers, each behind the isolating guard;
//! 4. with a UI-thread token only, the providers of the anchor component and
//!    its ancestors, inside an input-suppression section;
//! 5. context-kind rules.
//!
//! Editor keys are revalidated against the anchor before step 5. The first
//! failed or retry-requested upgrade latches the context: the handler hears
//! about it once, and every later pass through the chain aborts at once.

use super::anchor::{self, AnchorRef};
use super::cache::DataCache;
use super::types::{Collaborators, DataContext};
use super::user_data::{UserDataKey, UserDataStore};
use crate::config::ResolverSettings;
use crate::error::{AbortKind, UpgradeAbort};
use crate::provider::{GuardedProvider, RuleKind};
use crate::timestamp::{Timestamp, TimestampSet};
use crate::types::{keys, ActionId, DataKey, DataValue};
use crate::ui::{Affinity, Component};
use crate::upgrade::{upgrade, LoggingHandler, UpgradeResult, UpgradeResultHandler};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub struct ActionDataContext {
    action_id: ActionId,
    request: TimestampSet,
    actual: TimestampSet,
    parent: Option<Arc<dyn DataContext>>,
    handler: Arc<dyn UpgradeResultHandler>,
    collaborators: Collaborators,
    settings: ResolverSettings,
    cache: DataCache,
    upgrades: DashMap<DataKey, UpgradeResult>,
    user_data: UserDataStore,
    anchor: AnchorRef,
    failed: AtomicBool,
}

/// Builder for [`ActionDataContext`].
pub struct ActionDataContextBuilder {
    action_id: ActionId,
    request: TimestampSet,
    actual: TimestampSet,
    parent: Option<Arc<dyn DataContext>>,
    handler: Arc<dyn UpgradeResultHandler>,
    collaborators: Collaborators,
    settings: ResolverSettings,
}

impl ActionDataContextBuilder {
    pub fn parent(mut self, parent: Arc<dyn DataContext>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn UpgradeResultHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    pub fn settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build off the UI thread.
    pub fn build(self) -> Result<ActionDataContext, UpgradeAbort> {
        self.build_in(Affinity::Background)
    }

    /// Build and anchor the context.
    ///
    /// Anchoring resolves the control id through the chain, so a stale
    /// control id aborts construction the same way it would abort `resolve`.
    pub fn build_in(self, affinity: Affinity<'_>) -> Result<ActionDataContext, UpgradeAbort> {
        let mut context = ActionDataContext {
            action_id: self.action_id,
            request: self.request,
            actual: self.actual,
            parent: self.parent,
            handler: self.handler,
            collaborators: self.collaborators,
            settings: self.settings,
            cache: DataCache::new(),
            upgrades: DashMap::new(),
            user_data: UserDataStore::new(),
            anchor: AnchorRef::default(),
            failed: AtomicBool::new(false),
        };
        let control_id = context.resolve_via_chain(&keys::CONTROL_ID, affinity)?;
        let component = anchor::resolve_anchor(
            control_id.as_ref(),
            context.collaborators.editors.as_ref(),
            context.collaborators.ui.as_ref(),
        );
        debug!(
            action = %context.action_id,
            anchor = component.as_ref().map(|c| c.name()),
            "Action data context created"
        );
        context.anchor = AnchorRef::new(component);
        Ok(context)
    }
}

impl ActionDataContext {
    pub fn builder(
        action_id: impl Into<ActionId>,
        request: TimestampSet,
        actual: TimestampSet,
    ) -> ActionDataContextBuilder {
        ActionDataContextBuilder {
            action_id: action_id.into(),
            request,
            actual,
            parent: None,
            handler: Arc::new(LoggingHandler),
            collaborators: Collaborators::default(),
            settings: ResolverSettings::default(),
        }
    }

    pub fn action_id(&self) -> &ActionId {
        &self.action_id
    }

    pub fn parent(&self) -> Option<&Arc<dyn DataContext>> {
        self.parent.as_ref()
    }

    /// Whether a failed or retry-requested upgrade has latched this context.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// The anchor component, if one was found and is still alive.
    pub fn anchor_component(&self) -> Option<Arc<dyn Component>> {
        self.anchor.get()
    }

    pub fn get_user_data<T: Any + Send + Sync>(&self, key: &UserDataKey<T>) -> Option<Arc<T>> {
        self.user_data.get(key)
    }

    pub fn put_user_data<T: Any + Send + Sync>(&self, key: &UserDataKey<T>, value: Option<T>) {
        self.user_data.put(key, value);
    }

    pub fn user_data(&self) -> &UserDataStore {
        &self.user_data
    }

    /// Resolve `key` off the UI thread; the ancestry walk is skipped.
    pub fn resolve(&self, key: &DataKey) -> Result<Option<DataValue>, UpgradeAbort> {
        self.resolve_in(key, Affinity::Background)
    }

    /// Resolve `key` with the given thread affinity.
    pub fn resolve_in(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        // The anchor is only ever held weakly, so it never enters the cache.
        if key.is(&keys::CONTEXT_COMPONENT) {
            return self.resolve_sources(key, affinity);
        }
        if let Some(entry) = self.cache.get(key) {
            trace!(key = %key, hit = entry.is_some(), "Context cache hit");
            return Ok(entry);
        }
        let value = self.resolve_uncached(key, affinity)?;
        Ok(self.cache.insert_once(key.clone(), value))
    }

    /// Number of keys with a memoized outcome.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn resolve_uncached(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        if let Some(value) = self.resolve_sources(key, affinity)? {
            return Ok(Some(value));
        }
        let layered = |k: &DataKey| match self.cache.get(k) {
            Some(entry) => Ok(entry),
            None => self.resolve_sources(k, affinity),
        };
        self.collaborators
            .rules
            .apply(RuleKind::Context, key, &layered)
    }

    /// Chain, providers, ancestry and editor validation; no context-kind rules.
    fn resolve_sources(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        if key.is(&keys::CONTEXT_COMPONENT) {
            return Ok(self.anchor.get().map(DataValue::new));
        }
        let rules = &self.collaborators.rules;
        let chain = |k: &DataKey| self.resolve_via_chain(k, affinity);

        let mut data = rules.provider_and_rules(key, &chain)?;

        if data.is_none() {
            for provider in self.collaborators.providers.iter() {
                let source = GuardedProvider {
                    provider: provider.as_ref(),
                    chain: &chain,
                };
                data = rules.provider_and_rules(key, &source)?;
                if data.is_some() {
                    trace!(key = %key, provider = provider.name(), "Resolved from provider");
                    break;
                }
            }
        }

        let anchor = self.anchor.get();
        if data.is_none() && affinity.is_ui() && self.settings.ancestry_walk {
            data = anchor::walk_ancestry(
                key,
                anchor.clone(),
                self.collaborators.ui.as_ref(),
                rules,
                &chain,
                self.settings.max_ancestry_depth,
            )?;
        }

        if self.settings.validate_editors && self.settings.is_editor_key(key) {
            data = anchor::validate_editor(key, data, anchor.as_ref());
        }
        Ok(data)
    }

    /// Request-time timestamps first, then the parent.
    pub fn resolve_via_chain(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        if self.is_failed() {
            warn!(action = %self.action_id, key = %key, "Requesting data from an already failed context");
            return Err(UpgradeAbort::new(
                self.action_id.clone(),
                AbortKind::StaleContext,
                format!("Requesting {} for already failed context", key),
            ));
        }

        let Some(request) = self.request.get(key) else {
            return match &self.parent {
                Some(parent) => parent.resolve_in(key, affinity),
                None => Ok(None),
            };
        };
        if let Timestamp::Plain(data) = request {
            return Ok(data.clone());
        }

        let result = self
            .upgrades
            .entry(key.clone())
            .or_insert_with(|| upgrade(request, &self.actual))
            .value()
            .clone();
        match result {
            UpgradeResult::Success(timestamp) => {
                trace!(action = %self.action_id, key = %key, "Timestamp upgrade succeeded");
                Ok(timestamp.data())
            }
            UpgradeResult::Failure(failure) => {
                if self.latch() {
                    self.handler.on_failure(&self.action_id, &failure);
                }
                debug!(action = %self.action_id, key = %key, "Timestamp upgrade failed");
                Err(UpgradeAbort::new(
                    self.action_id.clone(),
                    AbortKind::Failure,
                    failure.message,
                ))
            }
            UpgradeResult::RetryRequest(retry) => {
                if self.latch() {
                    self.handler.on_retry_requested(&self.action_id, &retry);
                }
                debug!(action = %self.action_id, key = %key, "Timestamp upgrade requested a retry");
                Err(UpgradeAbort::new(
                    self.action_id.clone(),
                    AbortKind::RetryRequested,
                    retry.message,
                ))
            }
        }
    }

    /// Flip the latch; true only for the caller that flipped it.
    fn latch(&self) -> bool {
        self.failed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl DataContext for ActionDataContext {
    fn resolve_in(
        &self,
        key: &DataKey,
        affinity: Affinity<'_>,
    ) -> Result<Option<DataValue>, UpgradeAbort> {
        ActionDataContext::resolve_in(self, key, affinity)
    }
}

impl fmt::Debug for ActionDataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDataContext")
            .field("action_id", &self.action_id)
            .field("request_keys", &self.request.len())
            .field("actual_keys", &self.actual.len())
            .field("has_parent", &self.parent.is_some())
            .field("anchor", &self.anchor)
            .field("cached", &self.cache.len())
            .field("failed", &self.is_failed())
            .finish()
    }
}
