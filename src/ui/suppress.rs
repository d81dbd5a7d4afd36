//! Scoped input suppression.

use super::UiHost;

/// Keeps input events suppressed on the host until dropped.
#[must_use = "suppression ends as soon as the guard is dropped"]
pub struct InputSuppression<'a> {
    host: &'a dyn UiHost,
}

impl<'a> InputSuppression<'a> {
    pub fn start(host: &'a dyn UiHost, reason: &'static str) -> Self {
        host.begin_input_suppression(reason);
        Self { host }
    }
}

impl Drop for InputSuppression<'_> {
    fn drop(&mut self) {
        self.host.end_input_suppression();
    }
}
