//! HTTP-backed remote service.
//!
//! Maps each [`RemoteService`] operation onto a JSON request sent through
//! the [`HttpClient`] port.

use async_trait::async_trait;
use murmur_domain::{ApiError, ApiRequest, LoginRequest, Post, RegisterRequest};
use serde_json::{Value, json};

use crate::ports::{HttpClient, RemoteService};

/// Route of the login endpoint.
pub const LOGIN_PATH: &str = "/login";
/// Route of the registration endpoint.
pub const REGISTER_PATH: &str = "/register";
/// Route of the feed collection.
pub const POSTS_PATH: &str = "/posts";

/// [`RemoteService`] implementation that talks to the real service.
#[derive(Debug, Clone)]
pub struct HttpRemoteService<C> {
    client: C,
}

impl<C: HttpClient> HttpRemoteService<C> {
    /// Creates a remote service on top of an HTTP client.
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Returns the underlying HTTP client.
    pub const fn client(&self) -> &C {
        &self.client
    }
}

/// Serializes a request body.
fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::invalid_request(format!("Failed to encode request body: {e}")))
}

#[async_trait]
impl<C: HttpClient> RemoteService for HttpRemoteService<C> {
    async fn login(&self, request: &LoginRequest) -> Result<Option<Value>, ApiError> {
        let body = to_body(request)?;
        self.client.execute(&ApiRequest::post(LOGIN_PATH, body)).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Option<Value>, ApiError> {
        let body = to_body(request)?;
        self.client
            .execute(&ApiRequest::post(REGISTER_PATH, body))
            .await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let Some(body) = self.client.execute(&ApiRequest::get(POSTS_PATH)).await? else {
            tracing::debug!("post list response had no body, treating as empty feed");
            return Ok(Vec::new());
        };

        serde_json::from_value(body)
            .map_err(|e| ApiError::transport(format!("Malformed post list: {e}")))
    }

    async fn create_post(&self, text: &str) -> Result<Option<Value>, ApiError> {
        self.client
            .execute(&ApiRequest::post(POSTS_PATH, json!({ "text": text })))
            .await
    }
}
