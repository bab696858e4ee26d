//! Remote service port
//!
//! The account and content service as seen by the client. Implemented over
//! HTTP by [`crate::HttpRemoteService`] and in memory by the infrastructure
//! crate.

use async_trait::async_trait;
use murmur_domain::{ApiError, LoginRequest, Post, RegisterRequest};
use serde_json::Value;

/// Capability interface of the remote account/content service.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Authenticates an existing account.
    ///
    /// Returns the service's response body, if any.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the service rejects the credentials or the
    /// request fails.
    async fn login(&self, request: &LoginRequest) -> Result<Option<Value>, ApiError>;

    /// Creates a new account.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the service rejects the registration or the
    /// request fails.
    async fn register(&self, request: &RegisterRequest) -> Result<Option<Value>, ApiError>;

    /// Fetches the current feed, newest first.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the request fails or the response is not a
    /// list of posts.
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError>;

    /// Submits a new post.
    ///
    /// The returned body is ignored by the feed, which prepends an
    /// optimistic post instead.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the service rejects the post or the
    /// request fails.
    async fn create_post(&self, text: &str) -> Result<Option<Value>, ApiError>;
}
