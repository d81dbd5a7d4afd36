//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Aborted(abort) if abort.is_retry() => {
            format!("{} (action {} should be retried)", e, abort.action_id)
        }
        _ => e.to_string(),
    }
}
