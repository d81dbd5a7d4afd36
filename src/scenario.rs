//! Declarative resolution scenarios.
//!
//! A scenario file (TOML or JSON) describes one action invocation: its parent
//! values, request-time and actual-time timestamps, providers, and the keys
//! the action asks for. Replaying it builds a headless context, resolves each
//! key in order and reports outcomes plus handler notifications.

use crate::config::ResolverSettings;
use crate::context::{ActionDataContext, Collaborators, MapDataContext};
use crate::error::{ApiError, UpgradeAbort};
use crate::provider::{FailingProvider, StaticProvider};
use crate::timestamp::{Timestamp, TimestampSet};
use crate::types::{keys, ActionId, DataKey, DataValue};
use crate::upgrade::{HandlerEvent, RecordingHandler, RevisionPolicy, RevisionTimestamp, UpgradeResultHandler};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub action: ActionId,

    /// Keys resolved in order during replay.
    pub keys: Vec<String>,

    #[serde(default)]
    pub parent: BTreeMap<String, Value>,

    #[serde(default)]
    pub request: BTreeMap<String, TimestampSpec>,

    #[serde(default)]
    pub actual: BTreeMap<String, TimestampSpec>,

    #[serde(default)]
    pub providers: Vec<ProviderSpec>,

    /// Overrides the configured resolver settings for this scenario.
    #[serde(default)]
    pub resolver: Option<ResolverSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimestampSpec {
    Plain {
        #[serde(default)]
        value: Option<Value>,
    },
    Revision {
        document: String,
        revision: u64,
        #[serde(default)]
        mutating: bool,
        #[serde(default)]
        policy: RevisionPolicy,
        #[serde(default)]
        value: Option<Value>,
    },
}

impl TimestampSpec {
    fn to_timestamp(&self, key: &str) -> Timestamp {
        match self {
            TimestampSpec::Plain { value } => Timestamp::Plain(value.as_ref().map(to_data_value)),
            TimestampSpec::Revision {
                document,
                revision,
                mutating,
                policy,
                value,
            } => {
                let mut timestamp =
                    RevisionTimestamp::new(key, document.clone(), *revision).with_policy(*policy);
                if *mutating {
                    timestamp = timestamp.mutating();
                }
                if let Some(value) = value {
                    timestamp = timestamp.with_data(to_data_value(value));
                }
                Timestamp::upgradable(timestamp)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSpec {
    Static {
        name: String,
        #[serde(default)]
        values: BTreeMap<String, Value>,
    },
    Failing {
        name: String,
        message: String,
        /// Keys the provider fails for; every key when empty.
        #[serde(default)]
        keys: Vec<String>,
    },
}

impl ProviderSpec {
    pub fn name(&self) -> &str {
        match self {
            ProviderSpec::Static { name, .. } | ProviderSpec::Failing { name, .. } => name,
        }
    }
}

/// Scenario values become strings, integers and booleans where possible so
/// that providers and rules can downcast them naturally.
fn to_data_value(value: &Value) -> DataValue {
    match value {
        Value::String(s) => DataValue::text(s.clone()),
        Value::Bool(b) => DataValue::new(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DataValue::new(i),
            None => DataValue::new(value.clone()),
        },
        other => DataValue::new(other.clone()),
    }
}

fn timestamp_set(specs: &BTreeMap<String, TimestampSpec>) -> TimestampSet {
    specs
        .iter()
        .map(|(key, spec)| (DataKey::from(key.clone()), spec.to_timestamp(key)))
        .collect()
}

impl Scenario {
    /// Load from `path`; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path)?;
        let scenario: Scenario = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .map_err(|e| ApiError::ScenarioError(format!("{}: {}", path.display(), e)))?,
            _ => toml::from_str(&raw)
                .map_err(|e| ApiError::ScenarioError(format!("{}: {}", path.display(), e)))?,
        };
        debug!(path = %path.display(), action = %scenario.action, "Scenario loaded");
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();

        if self.keys.is_empty() {
            problems.push("scenario resolves no keys".to_string());
        }
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.name()) {
                problems.push(format!("duplicate provider name: {}", provider.name()));
            }
        }
        if let Some(settings) = &self.resolver {
            if let Err(e) = settings.validate() {
                problems.push(e);
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ScenarioError(problems.join("; ")))
        }
    }

    /// The settings this scenario runs with, given the configured ones.
    pub fn effective_settings(&self, configured: ResolverSettings) -> ResolverSettings {
        self.resolver.clone().unwrap_or(configured)
    }

    pub fn collaborators(&self) -> Collaborators {
        self.providers
            .iter()
            .fold(Collaborators::new(), |collaborators, spec| match spec {
                ProviderSpec::Static { name, values } => {
                    let provider = values.iter().fold(StaticProvider::new(name.clone()), |p, (k, v)| {
                        p.with(k.clone(), to_data_value(v))
                    });
                    collaborators.provider(Arc::new(provider))
                }
                ProviderSpec::Failing { name, message, keys } => {
                    let provider = FailingProvider::new(name.clone(), message.clone())
                        .for_keys(keys.iter().cloned().map(DataKey::from));
                    collaborators.provider(Arc::new(provider))
                }
            })
    }

    /// Build the headless context this scenario describes.
    pub fn build_context(
        &self,
        settings: ResolverSettings,
        handler: Arc<dyn UpgradeResultHandler>,
    ) -> Result<ActionDataContext, UpgradeAbort> {
        let parent = self
            .parent
            .iter()
            .fold(MapDataContext::new(), |ctx, (k, v)| ctx.with(k.clone(), to_data_value(v)));

        ActionDataContext::builder(
            self.action.clone(),
            timestamp_set(&self.request),
            timestamp_set(&self.actual),
        )
        .parent(Arc::new(parent))
        .handler(handler)
        .collaborators(self.collaborators())
        .settings(self.effective_settings(settings))
        .build()
    }

    /// Replay with default resolver settings.
    pub fn replay(&self) -> ReplayReport {
        self.replay_with(ResolverSettings::default())
    }

    pub fn replay_with(&self, settings: ResolverSettings) -> ReplayReport {
        let handler = Arc::new(RecordingHandler::new());

        let (outcomes, failed) = match self.build_context(settings, handler.clone()) {
            Ok(context) => {
                let outcomes = self
                    .keys
                    .iter()
                    .map(|key| KeyOutcome::new(key, context.resolve(&DataKey::from(key.clone()))))
                    .collect();
                (outcomes, context.is_failed())
            }
            Err(abort) => {
                debug!(action = %self.action, "Context construction aborted");
                (vec![KeyOutcome::new(keys::CONTROL_ID.name(), Err(abort))], true)
            }
        };

        let report = ReplayReport {
            action: self.action.clone(),
            outcomes,
            notifications: handler.events(),
            failed,
        };
        info!(
            action = %report.action,
            resolved = report.count(|o| matches!(o, Outcome::Resolved { .. })),
            aborted = report.count(|o| matches!(o, Outcome::Aborted { .. })),
            "Scenario replayed"
        );
        report
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Resolved { value: String },
    Absent,
    Aborted { kind: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl KeyOutcome {
    fn new(key: &str, result: Result<Option<DataValue>, UpgradeAbort>) -> Self {
        let outcome = match result {
            Ok(Some(value)) => Outcome::Resolved {
                value: value.describe(),
            },
            Ok(None) => Outcome::Absent,
            Err(abort) => Outcome::Aborted {
                kind: abort.kind.to_string(),
                message: abort.message,
            },
        };
        Self {
            key: key.to_string(),
            outcome,
        }
    }
}

/// Result of replaying a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub action: ActionId,
    pub outcomes: Vec<KeyOutcome>,
    pub notifications: Vec<HandlerEvent>,
    /// Whether the context latched a failure.
    pub failed: bool,
}

impl ReplayReport {
    pub fn outcome(&self, key: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.key == key).map(|o| &o.outcome)
    }

    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }
}
