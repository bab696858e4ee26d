//! Startup error types

use murmur_domain::{ApiError, SettingsError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that prevent a [`crate::ClientShell`] from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be read from the environment.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The settings are unusable.
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Http(#[from] ApiError),
}
