//! Application error types

use murmur_domain::{ApiError, ValidationError};
use thiserror::Error;

/// Errors surfaced to the presentation layer by every client operation.
///
/// Nothing here is fatal: the caller displays the message and lets the user
/// retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Local validation failed; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request failed at the network or service level.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    /// Returns the API error, if this is one.
    #[must_use]
    pub const fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::Validation(_) => None,
        }
    }

    /// Returns true if the failure was detected locally.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
