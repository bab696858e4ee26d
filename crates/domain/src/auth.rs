//! Authentication payloads, form validation and session state.
//!
//! Validation is pure and synchronous: a form that fails here never
//! reaches the network.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Minimum accepted password length at registration, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Body of a `/login` request.
///
/// The account identifier is sent as both `username` and `email`: the
/// service accepts either and the client cannot tell which one the account
/// was registered with.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Account identifier, duplicated from `email`.
    pub username: String,
    /// Account identifier, duplicated from `username`.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl LoginRequest {
    /// Validates the login form and builds the request body.
    ///
    /// The identifier is trimmed; the password is sent as typed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyField`] for the first empty field.
    pub fn new(identifier: &str, password: &str) -> Result<Self, ValidationError> {
        let identifier = required("identifier", identifier)?;
        present("password", password)?;

        Ok(Self {
            username: identifier.to_string(),
            email: identifier.to_string(),
            password: password.to_string(),
        })
    }

    /// The account identifier used for this login.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signup form as entered by the user.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Display name, sent as `username`.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Password typed a second time.
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Creates a form from its four fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Validates the form and builds the `/register` request body.
    ///
    /// Checks run in order: all fields present, passwords match, password
    /// long enough. The first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        present("password", &self.password)?;
        present("confirm_password", &self.confirm_password)?;

        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(RegisterRequest {
            username: name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of a `/register` request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Display name from the signup form.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity established by a successful login or registration.
///
/// Held only in memory; nothing here is sent with later requests; the
/// service tracks the session through cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier or email the user authenticated with.
    pub identifier: String,
    /// Raw service response, kept opaque.
    pub payload: Option<Value>,
}

impl Session {
    /// Creates a session for the given identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            identifier: identifier.into(),
            payload,
        }
    }
}

/// Passwords are taken as typed: only a zero-length value is missing.
fn present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(trimmed)
    }
}
