//! Stop action - fails the enclosing playlist with a reason

use crate::parse_options;
use playlist_core::{Action, ActionError, ActionResult, Completion};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
struct StopOptions {
    reason: String,
}

/// Fails as soon as it begins
pub struct StopAction {
    completion: Completion,
    reason: String,
}

impl StopAction {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            completion: Completion::new(),
            reason: reason.into(),
        }
    }

    /// Build from descriptor options
    pub fn from_options(options: Value) -> ActionResult<Self> {
        let options: StopOptions = parse_options(options)?;
        Ok(Self::new(options.reason))
    }
}

impl Action for StopAction {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn begin(&self, _input: Value) {
        debug!(reason = %self.reason, "Stopping playlist");
        self.fail(ActionError::failed(self.reason.clone()));
    }
}
