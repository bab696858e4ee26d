//! Domain error types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Local validation failures detected before any request is dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required form field is empty or whitespace-only.
    #[error("Please fill in all fields ({field} is empty)")]
    EmptyField {
        /// Name of the first empty field.
        field: &'static str,
    },

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password is shorter than the accepted minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length, in characters.
        min: usize,
    },

    /// Post text is empty after trimming.
    #[error("Please enter some text for your post")]
    EmptyPost,

    /// Post text exceeds the maximum length.
    #[error("Post is too long ({actual} characters, maximum is {max})")]
    PostTooLong {
        /// Maximum accepted length, in characters.
        max: usize,
        /// Length of the rejected text, in characters.
        actual: usize,
    },
}

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The service answered with a non-success HTTP status.
    Status,
    /// The request deadline expired.
    Timeout,
    /// The connection failed or the response could not be read.
    Transport,
    /// The request could not be built (bad path or base URL).
    InvalidRequest,
}

/// Network or service-level failure surfaced to the caller.
///
/// `status_code` is the HTTP status for [`ApiErrorKind::Status`] and `0`
/// for every failure that never produced a response.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, server-supplied when available.
    pub message: String,
    /// HTTP status code, or `0` when no response was received.
    pub status_code: u16,
    /// Failure category.
    pub kind: ApiErrorKind,
}

impl ApiError {
    /// Builds an error from a failed HTTP status and the parsed response body.
    ///
    /// Uses the body's string `message` field when present, otherwise a
    /// generic message naming the status code.
    #[must_use]
    pub fn from_status(status_code: u16, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(|| format!("Request failed ({status_code})"), str::to_string);

        Self {
            message,
            status_code,
            kind: ApiErrorKind::Status,
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self {
            message: format!("Request timed out after {timeout_ms}ms"),
            status_code: 0,
            kind: ApiErrorKind::Timeout,
        }
    }

    /// Creates a transport-level error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 0,
            kind: ApiErrorKind::Transport,
        }
    }

    /// Creates an error for a request that could not be built.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 0,
            kind: ApiErrorKind::InvalidRequest,
        }
    }

    /// Returns true if the request timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn status_error_uses_server_message() {
        let body = json!({"message": "not found"});
        let err = ApiError::from_status(404, Some(&body));

        assert_eq!(
            err,
            ApiError {
                message: "not found".to_string(),
                status_code: 404,
                kind: ApiErrorKind::Status,
            }
        );
    }

    #[test]
    fn status_error_falls_back_to_status_code() {
        assert_eq!(ApiError::from_status(500, None).message, "Request failed (500)");

        let body = json!({"error": "boom"});
        assert_eq!(
            ApiError::from_status(502, Some(&body)).message,
            "Request failed (502)"
        );

        let body = json!({"message": 42});
        assert_eq!(
            ApiError::from_status(400, Some(&body)).message,
            "Request failed (400)"
        );
    }

    #[test]
    fn timeout_error() {
        let err = ApiError::timeout(1500);
        assert!(err.is_timeout());
        assert_eq!(err.status_code, 0);
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            ValidationError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }
}
