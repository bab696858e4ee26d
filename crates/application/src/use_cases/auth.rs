//! Login and registration use cases.

use std::sync::Arc;

use murmur_domain::{LoginRequest, RegistrationForm, Session};

use crate::ports::RemoteService;
use crate::{ClientError, ClientResult};

/// Use case for signing in to an existing account.
pub struct Login<S: ?Sized> {
    service: Arc<S>,
}

impl<S: RemoteService + ?Sized> Login<S> {
    /// Creates a new `Login` use case.
    #[must_use]
    pub const fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Validates the credentials and sends exactly one login request.
    ///
    /// The resulting session is returned to the caller, which decides
    /// whether to keep it. Failures are not retried.
    ///
    /// # Errors
    /// - [`ClientError::Validation`] if a field is empty (no request sent)
    /// - [`ClientError::Api`] if the service rejects the login
    pub async fn execute(&self, identifier: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest::new(identifier, password)?;

        tracing::debug!(identifier = request.identifier(), "sending login request");
        let payload = self.service.login(&request).await.map_err(|e| {
            tracing::warn!(status = e.status_code, error = %e, "login failed");
            ClientError::from(e)
        })?;

        tracing::info!(identifier = request.identifier(), "login succeeded");
        Ok(Session::new(request.identifier(), payload))
    }
}

/// Use case for creating a new account.
pub struct Register<S: ?Sized> {
    service: Arc<S>,
}

impl<S: RemoteService + ?Sized> Register<S> {
    /// Creates a new `Register` use case.
    #[must_use]
    pub const fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Validates the signup form and sends one registration request.
    ///
    /// The session is keyed by the registered email.
    ///
    /// # Errors
    /// - [`ClientError::Validation`] for empty fields, mismatching passwords
    ///   or a password that is too short (no request sent)
    /// - [`ClientError::Api`] if the service rejects the registration
    pub async fn execute(&self, form: &RegistrationForm) -> ClientResult<Session> {
        let request = form.validate()?;

        tracing::debug!(email = %request.email, "sending registration request");
        let payload = self.service.register(&request).await.map_err(|e| {
            tracing::warn!(status = e.status_code, error = %e, "registration failed");
            ClientError::from(e)
        })?;

        tracing::info!(email = %request.email, "registration succeeded");
        Ok(Session::new(request.email, payload))
    }
}
