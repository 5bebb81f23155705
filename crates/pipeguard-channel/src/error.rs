//! Error types for channel construction.

use thiserror::Error;

/// Errors that can occur while building a [`Channel`](crate::Channel).
///
/// Full and empty conditions are not errors: they are reported through the
/// return values of `try_send` and `try_receive`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// A channel must hold at least one record.
    #[error("channel capacity must be at least 1")]
    ZeroCapacity,
}

/// A specialized `Result` type for channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;
