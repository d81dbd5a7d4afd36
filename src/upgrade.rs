//! Timestamp upgrade protocol.
//!
//! An upgrade reconciles one request-time timestamp against the whole
//! actual-time set and yields a terminal [`UpgradeResult`]. The call is
//! synchronous and has no side effects beyond its return value; recording the
//! outcome and notifying the handler is the resolver's job.

use crate::timestamp::{Timestamp, TimestampSet};
use crate::types::DataValue;
use std::any::Any;
use std::fmt;

mod handler;
mod revision;

pub use handler::{HandlerEvent, LoggingHandler, RecordingHandler, UpgradeResultHandler};
pub use revision::{RevisionPolicy, RevisionTimestamp};

/// A timestamp that must be reconciled before its data is trusted.
pub trait UpgradableTimestamp: fmt::Debug + Send + Sync {
    /// Data as captured at request time.
    fn data(&self) -> Option<DataValue>;

    /// Reconcile against the actual-time set.
    fn upgrade(&self, actual: &TimestampSet) -> UpgradeResult;

    /// Lets an implementation recognise its own kind in the actual-time set.
    fn as_any(&self) -> &dyn Any;
}

/// The snapshot cannot be reconciled with current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeFailure {
    pub message: String,
}

/// State was observed mid-mutation; the action should be re-dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    pub message: String,
}

/// Terminal outcome of one upgrade call.
#[derive(Debug, Clone)]
pub enum UpgradeResult {
    /// Still valid, possibly re-pointed to an equivalent current timestamp.
    Success(Timestamp),
    Failure(UpgradeFailure),
    RetryRequest(RetryRequest),
}

impl UpgradeResult {
    pub fn failure(message: impl Into<String>) -> Self {
        UpgradeResult::Failure(UpgradeFailure {
            message: message.into(),
        })
    }

    pub fn retry(message: impl Into<String>) -> Self {
        UpgradeResult::RetryRequest(RetryRequest {
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpgradeResult::Success(_))
    }
}

/// Upgrade a request-time timestamp. Plain timestamps are trivially current.
pub fn upgrade(request: &Timestamp, actual: &TimestampSet) -> UpgradeResult {
    match request {
        Timestamp::Plain(_) => UpgradeResult::Success(request.clone()),
        Timestamp::Upgradable(timestamp) => timestamp.upgrade(actual),
    }
}
