//! Error types for the action data context engine.

use crate::types::ActionId;
use std::fmt;
use thiserror::Error;

/// Why a context refused to produce data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortKind {
    /// A protected key could not be reconciled with the actual state.
    Failure,
    /// State was mid-mutation; the whole action should be dispatched again.
    RetryRequested,
    /// The context had already latched a failure before this request.
    StaleContext,
}

impl fmt::Display for AbortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbortKind::Failure => "failure",
            AbortKind::RetryRequested => "retry requested",
            AbortKind::StaleContext => "stale context",
        };
        f.write_str(label)
    }
}

/// Abort signal raised out of `resolve` when the self/parent chain hits a
/// failed or retry-requested timestamp upgrade.
///
/// The dispatch framework catches this and abandons or re-dispatches the
/// action; it must never proceed with partial data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpgradeAbort {
    pub action_id: ActionId,
    pub kind: AbortKind,
    pub message: String,
}

impl UpgradeAbort {
    pub fn new(action_id: ActionId, kind: AbortKind, message: impl Into<String>) -> Self {
        Self {
            action_id,
            kind,
            message: message.into(),
        }
    }

    /// True when the framework should retry the action rather than drop it.
    pub fn is_retry(&self) -> bool {
        self.kind == AbortKind::RetryRequested
    }
}

/// Errors surfaced by rules and providers.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source itself broke; isolated and folded into "no data".
    #[error("data source failed: {0}")]
    Failed(String),

    /// The chain aborted underneath the source; always propagated.
    #[error(transparent)]
    Abort(#[from] UpgradeAbort),
}

impl SourceError {
    pub fn failed(message: impl Into<String>) -> Self {
        SourceError::Failed(message.into())
    }
}

/// Errors at the edges of the engine: configuration, logging and scenario replay.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scenario error: {0}")]
    ScenarioError(String),

    #[error("Resolution aborted ({}): {}", .0.kind, .0.message)]
    Aborted(#[from] UpgradeAbort),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
