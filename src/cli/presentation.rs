//! CLI presentation: text and json formatters for replay and validate.

use crate::error::ApiError;
use crate::scenario::{Outcome, ReplayReport, Scenario};
use crate::upgrade::HandlerEvent;

pub fn format_replay_text(report: &ReplayReport) -> String {
    let mut s = format!("Action: {}", report.action);
    for entry in &report.outcomes {
        let line = match &entry.outcome {
            Outcome::Resolved { value } => format!("\n  {} = {}", entry.key, value),
            Outcome::Absent => format!("\n  {} = <absent>", entry.key),
            Outcome::Aborted { kind, message } => {
                format!("\n  {} aborted ({}): {}", entry.key, kind, message)
            }
        };
        s.push_str(&line);
    }
    if !report.notifications.is_empty() {
        s.push_str(&format!("\n\nNotifications ({}):", report.notifications.len()));
        for event in &report.notifications {
            let line = match event {
                HandlerEvent::Failure { message, .. } => format!("\n  - failure: {}", message),
                HandlerEvent::RetryRequested { message, .. } => {
                    format!("\n  - retry requested: {}", message)
                }
            };
            s.push_str(&line);
        }
    }
    if report.failed {
        s.push_str("\n\nContext failed.");
    }
    s
}

pub fn format_replay_json(report: &ReplayReport) -> Result<String, ApiError> {
    serde_json::to_string_pretty(report).map_err(|e| ApiError::ScenarioError(e.to_string()))
}

pub fn format_validate_text(scenario: &Scenario) -> String {
    format!(
        "Scenario valid:\n  Action: {}\n  Keys: {}\n  Request timestamps: {}\n  Actual timestamps: {}\n  Providers: {}",
        scenario.action,
        scenario.keys.len(),
        scenario.request.len(),
        scenario.actual.len(),
        scenario.providers.len()
    )
}
