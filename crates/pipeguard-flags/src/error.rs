//! Error types for flag set access.

use thiserror::Error;

/// Errors that can occur when accessing a [`FlagSet`](crate::FlagSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// Another drain handle is alive; a second reader would lose bits.
    #[error("flag set already has an exclusive reader")]
    ReaderAlreadyClaimed,
}

/// A specialized `Result` type for flag set operations.
pub type FlagResult<T> = std::result::Result<T, FlagError>;
