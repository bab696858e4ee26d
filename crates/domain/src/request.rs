//! JSON request description handed to the HTTP client port.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// HTTP methods used against the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    Get,
    /// HTTP POST method, the default for JSON calls
    #[default]
    Post,
}

impl HttpMethod {
    /// Returns the method as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A JSON request relative to the configured base endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Route path, starting with `/`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request with an explicit method.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }

    /// Creates a `GET` request without body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, None)
    }

    /// Creates a `POST` request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path, Some(body))
    }

    /// Joins this request's path onto `base_url`.
    ///
    /// A trailing `/` on the base is dropped so `http://host/` and
    /// `http://host` behave the same.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] of kind `InvalidRequest` if the path does not
    /// start with `/`.
    pub fn url(&self, base_url: &str) -> Result<String, ApiError> {
        if !self.path.starts_with('/') {
            return Err(ApiError::invalid_request(format!(
                "Request path must start with '/': {}",
                self.path
            )));
        }

        Ok(format!("{}{}", base_url.trim_end_matches('/'), self.path))
    }
}
