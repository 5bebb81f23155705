//! Error types for watchdog operations.

use thiserror::Error;

use crate::task::TaskId;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The task never registered with this watchdog.
    #[error("Task not registered: {0}")]
    NotRegistered(TaskId),

    /// The task is already registered.
    #[error("Task already registered: {0}")]
    AlreadyRegistered(TaskId),

    /// The deadline was missed; the watchdog no longer accepts resets.
    #[error("Watchdog has expired")]
    Expired,

    /// State transition not allowed.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: &'static str,
        /// Attempted target state.
        to: &'static str,
    },
}

impl WatchdogError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an invalid transition error.
    #[must_use]
    pub fn invalid_transition(from: &'static str, to: &'static str) -> Self {
        Self::InvalidTransition { from, to }
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchdogError::NotRegistered(TaskId::new("consumer"));
        assert_eq!(err.to_string(), "Task not registered: consumer");

        let err = WatchdogError::invalid_transition("Expired", "Armed");
        assert_eq!(err.to_string(), "Invalid state transition: Expired -> Armed");
    }
}
