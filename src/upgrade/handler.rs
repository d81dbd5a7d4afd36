//! Receivers for terminal non-success upgrade outcomes.

use super::{RetryRequest, UpgradeFailure};
use crate::types::ActionId;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

/// Notified at most once per context, at the first failed or retry-requested upgrade.
pub trait UpgradeResultHandler: Send + Sync {
    fn on_failure(&self, action_id: &ActionId, result: &UpgradeFailure);

    fn on_retry_requested(&self, action_id: &ActionId, result: &RetryRequest);
}

/// Reports outcomes through `tracing` and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl UpgradeResultHandler for LoggingHandler {
    fn on_failure(&self, action_id: &ActionId, result: &UpgradeFailure) {
        warn!(action = %action_id, message = %result.message, "Action aborted: timestamp upgrade failed");
    }

    fn on_retry_requested(&self, action_id: &ActionId, result: &RetryRequest) {
        info!(action = %action_id, message = %result.message, "Action will be retried");
    }
}

/// One handler notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandlerEvent {
    Failure { action_id: ActionId, message: String },
    RetryRequested { action_id: ActionId, message: String },
}

/// Keeps every notification in memory, for replay reports and tests.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<HandlerEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HandlerEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl UpgradeResultHandler for RecordingHandler {
    fn on_failure(&self, action_id: &ActionId, result: &UpgradeFailure) {
        self.events.lock().push(HandlerEvent::Failure {
            action_id: action_id.clone(),
            message: result.message.clone(),
        });
    }

    fn on_retry_requested(&self, action_id: &ActionId, result: &RetryRequest) {
        self.events.lock().push(HandlerEvent::RetryRequested {
            action_id: action_id.clone(),
            message: result.message.clone(),
        });
    }
}
