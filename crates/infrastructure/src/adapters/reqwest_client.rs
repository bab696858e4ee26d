//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It handles all HTTP communication with the remote service.

use std::time::Duration;

use async_trait::async_trait;
use murmur_application::ports::HttpClient;
use murmur_domain::{ApiError, ApiRequest, ClientSettings, HttpMethod};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Url};
use serde_json::Value;

/// HTTP client implementation using reqwest.
///
/// Wraps a `reqwest::Client` with a cookie store, so session cookies set by
/// the service are sent back on every later request.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client for the given base endpoint.
    ///
    /// Default configuration:
    /// - Cookie store: enabled
    /// - Request timeout: `timeout`
    /// - User-Agent: "Murmur/<version>"
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client cannot be created.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("Murmur/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url, timeout))
    }

    /// Creates a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the client cannot be created.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiError> {
        Self::new(settings.base_url(), settings.timeout())
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// The base endpoint every request path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    /// Parses a response body as JSON.
    ///
    /// Empty, `null` and non-JSON bodies are treated as absent.
    fn parse_body(bytes: &[u8]) -> Option<Value> {
        if bytes.is_empty() {
            return None;
        }

        match serde_json::from_slice(bytes) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    len = bytes.len(),
                    "response body is not JSON, ignoring"
                );
                None
            }
        }
    }

    /// Maps reqwest errors to domain `ApiError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> ApiError {
        if error.is_timeout() {
            return ApiError::timeout(timeout_ms);
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            return ApiError::transport(format!("Could not connect to {host}: {error}"));
        }

        ApiError::transport(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = request.url(&self.base_url)?;
        let parsed_url =
            Url::parse(&url).map_err(|e| ApiError::invalid_request(format!("{e}: {url}")))?;
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), parsed_url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json");

        // `json` also sets `Content-Type: application/json`
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, %url, "sending request");

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;
        let body = Self::parse_body(&bytes);

        tracing::debug!(
            method = %request.method,
            %url,
            status = status.as_u16(),
            "received response"
        );

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), body.as_ref()));
        }

        Ok(body)
    }
}
