//! HTTP Client port

use async_trait::async_trait;
use murmur_domain::{ApiError, ApiRequest};
use serde_json::Value;

/// Port for sending JSON requests to the configured base endpoint.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the parsed JSON body.
    ///
    /// A success response whose body is empty or not JSON yields
    /// `Ok(None)`; an unparseable body is never an error on its own.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for non-success statuses (carrying the
    /// server's `message` when present), timeouts and transport failures.
    async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError>;
}
