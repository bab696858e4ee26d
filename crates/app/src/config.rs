//! Environment configuration.
//!
//! Reads [`ClientSettings`] from `MURMUR_*` environment variables. Unset
//! variables keep their defaults.

use murmur_domain::{ClientSettings, SettingsError};
use thiserror::Error;

/// Base endpoint override.
pub const ENV_API_URL: &str = "MURMUR_API_URL";
/// Target platform (`android`, `ios`, `web`, `desktop`).
pub const ENV_PLATFORM: &str = "MURMUR_PLATFORM";
/// Request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "MURMUR_TIMEOUT_MS";
/// Retry timed-out feed loads once (`true`/`false`).
pub const ENV_RETRY_READS: &str = "MURMUR_RETRY_READS";
/// Remote service implementation (`http` or `memory`).
pub const ENV_BACKEND: &str = "MURMUR_BACKEND";

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value the settings reject.
    #[error("{var}: {source}")]
    Invalid {
        /// Offending environment variable.
        var: &'static str,
        /// Underlying settings error.
        #[source]
        source: SettingsError,
    },

    /// A boolean flag is neither true nor false.
    #[error("{var}: expected true or false, got {value:?}")]
    InvalidFlag {
        /// Offending environment variable.
        var: &'static str,
        /// Value found.
        value: String,
    },
}

/// Reads settings from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first invalid variable.
pub fn from_env() -> Result<ClientSettings, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Reads settings through an arbitrary variable lookup.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first invalid variable.
pub fn from_lookup<F>(lookup: F) -> Result<ClientSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let mut settings = ClientSettings::default();

    if let Some(url) = get(ENV_API_URL) {
        settings.api_url = Some(url.trim().to_string());
    }

    if let Some(platform) = get(ENV_PLATFORM) {
        settings.platform = platform.parse().map_err(|source| ConfigError::Invalid {
            var: ENV_PLATFORM,
            source,
        })?;
    }

    if let Some(timeout) = get(ENV_TIMEOUT_MS) {
        settings.timeout_ms = timeout
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var: ENV_TIMEOUT_MS,
                source: SettingsError::InvalidTimeout(timeout.clone()),
            })?;
    }

    if let Some(flag) = get(ENV_RETRY_READS) {
        settings.retry_reads_on_timeout = parse_flag(ENV_RETRY_READS, &flag)?;
    }

    if let Some(backend) = get(ENV_BACKEND) {
        settings.backend = backend.parse().map_err(|source| ConfigError::Invalid {
            var: ENV_BACKEND,
            source,
        })?;
    }

    settings.validate().map_err(|source| {
        let var = match source {
            SettingsError::InvalidTimeout(_) => ENV_TIMEOUT_MS,
            _ => ENV_API_URL,
        };
        ConfigError::Invalid { var, source }
    })?;

    Ok(settings)
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use murmur_domain::{BackendKind, Platform};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let settings = from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn reads_every_variable() {
        let settings = from_lookup(lookup(&[
            (ENV_API_URL, "https://api.example.com"),
            (ENV_PLATFORM, "android"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_RETRY_READS, "false"),
            (ENV_BACKEND, "memory"),
        ]))
        .unwrap();

        assert_eq!(settings.base_url(), "https://api.example.com");
        assert_eq!(settings.platform, Platform::Android);
        assert_eq!(settings.timeout_ms, 2500);
        assert!(!settings.retry_reads_on_timeout);
        assert_eq!(settings.backend, BackendKind::Memory);
    }

    #[test]
    fn platform_default_applies_without_override() {
        let vars = [(ENV_PLATFORM, "android"), (ENV_API_URL, "")];
        let settings = from_lookup(lookup(&vars)).unwrap();
        assert_eq!(settings.base_url(), "http://10.0.2.2:3001");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = from_lookup(lookup(&[(ENV_PLATFORM, "symbian")])).unwrap_err();
        assert!(err.to_string().starts_with(ENV_PLATFORM));

        let err = from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_TIMEOUT_MS, .. }));

        let err = from_lookup(lookup(&[(ENV_TIMEOUT_MS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_TIMEOUT_MS, .. }));

        let err = from_lookup(lookup(&[(ENV_RETRY_READS, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));

        let err = from_lookup(lookup(&[(ENV_API_URL, "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_API_URL, .. }));
    }
}
