//! Error types for actions

use thiserror::Error;

/// Result type for action outcomes
pub type ActionResult<T> = Result<T, ActionError>;

/// Errors an action can settle with, or that arise while driving one
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// The action signalled failure through [`crate::Action::fail`]
    #[error("action failed: {message}")]
    Failed { message: String },

    /// The action constructor rejected its options
    #[error("invalid action options: {reason}")]
    InvalidOptions { reason: String },

    /// `begin` was already issued for this instance
    #[error("action already started")]
    AlreadyStarted,

    /// The completion signal was dropped without being settled
    #[error("action dropped its completion without settling")]
    Abandoned,
}

impl ActionError {
    /// Build a [`ActionError::Failed`] from any message
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Build a [`ActionError::InvalidOptions`] from any reason
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ActionError::failed("modal closed").to_string(),
            "action failed: modal closed"
        );
        assert_eq!(
            ActionError::invalid_options("missing field `timeout`").to_string(),
            "invalid action options: missing field `timeout`"
        );
        assert_eq!(
            ActionError::AlreadyStarted.to_string(),
            "action already started"
        );
    }
}
