//! Revision-based timestamps for documents that can change between the
//! client's request and the host's execution.

use super::{UpgradableTimestamp, UpgradeResult};
use crate::timestamp::{Timestamp, TimestampSet};
use crate::types::{DataKey, DataValue};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// What to do when the document moved on since the request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPolicy {
    /// Any newer revision makes the request stale.
    #[default]
    Exact,
    /// A newer settled revision is equivalent; use its data.
    FollowLatest,
}

/// Marks the value of `key` as observed at `revision` of `document`.
#[derive(Debug, Clone)]
pub struct RevisionTimestamp {
    pub key: DataKey,
    pub document: String,
    pub revision: u64,
    /// Set on actual-time entries while the document is being edited.
    pub mutating: bool,
    pub policy: RevisionPolicy,
    pub data: Option<DataValue>,
}

impl RevisionTimestamp {
    pub fn new(key: impl Into<DataKey>, document: impl Into<String>, revision: u64) -> Self {
        Self {
            key: key.into(),
            document: document.into(),
            revision,
            mutating: false,
            policy: RevisionPolicy::Exact,
            data: None,
        }
    }

    pub fn with_data(mut self, data: DataValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_policy(mut self, policy: RevisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mutating(mut self) -> Self {
        self.mutating = true;
        self
    }

    fn reconcile(&self, current: &RevisionTimestamp) -> UpgradeResult {
        if current.document != self.document {
            return UpgradeResult::failure(format!(
                "document changed for {}: requested {}, now {}",
                self.key, self.document, current.document
            ));
        }
        if current.mutating {
            return UpgradeResult::retry(format!(
                "document {} is being modified",
                current.document
            ));
        }
        if current.revision == self.revision {
            return UpgradeResult::Success(Timestamp::Plain(self.data.clone()));
        }
        if current.revision < self.revision {
            return UpgradeResult::failure(format!(
                "actual revision {} of {} precedes request revision {}",
                current.revision, self.document, self.revision
            ));
        }
        match self.policy {
            RevisionPolicy::Exact => UpgradeResult::failure(format!(
                "stale: {} moved from revision {} to {}",
                self.document, self.revision, current.revision
            )),
            RevisionPolicy::FollowLatest => {
                UpgradeResult::Success(Timestamp::Plain(current.data.clone()))
            }
        }
    }
}

impl UpgradableTimestamp for RevisionTimestamp {
    fn data(&self) -> Option<DataValue> {
        self.data.clone()
    }

    fn upgrade(&self, actual: &TimestampSet) -> UpgradeResult {
        match actual.get(&self.key) {
            None => UpgradeResult::failure(format!("no actual-time timestamp for {}", self.key)),
            Some(current @ Timestamp::Plain(_)) => UpgradeResult::Success(current.clone()),
            Some(Timestamp::Upgradable(other)) => {
                match other.as_any().downcast_ref::<RevisionTimestamp>() {
                    Some(current) => self.reconcile(current),
                    None => UpgradeResult::failure(format!(
                        "incompatible timestamp kinds for {}",
                        self.key
                    )),
                }
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
