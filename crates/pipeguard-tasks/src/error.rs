//! Error types for pipeline bootstrap.
//!
//! Steady-state conditions such as a full channel, an empty receive or a
//! failed scratch allocation are outcomes, not errors. They are reported as
//! status flags and log lines and never surface here.

use thiserror::Error;

use pipeguard_channel::ChannelError;
use pipeguard_flags::FlagError;
use pipeguard_watchdog::WatchdogError;

/// Result type alias for pipeline operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Errors raised while building or starting a pipeline.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Channel construction failed.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Flag reader could not be claimed.
    #[error("Flag error: {0}")]
    Flags(#[from] FlagError),

    /// Watchdog registration or configuration failed.
    #[error("Watchdog error: {0}")]
    Watchdog(#[from] WatchdogError),
}

impl TaskError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeguard_watchdog::TaskId;

    #[test]
    fn test_error_display() {
        let err = TaskError::invalid_configuration("channel_capacity must be > 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: channel_capacity must be > 0"
        );
    }

    #[test]
    fn test_wrapped_errors_convert() {
        let err: TaskError = WatchdogError::AlreadyRegistered(TaskId::new("producer")).into();
        assert!(matches!(err, TaskError::Watchdog(_)));

        let err: TaskError = FlagError::ReaderAlreadyClaimed.into();
        assert!(matches!(err, TaskError::Flags(_)));

        let err: TaskError = ChannelError::ZeroCapacity.into();
        assert!(matches!(err, TaskError::Channel(_)));
    }
}
