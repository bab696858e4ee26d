//! Client Settings Domain Model
//!
//! Defines how the client reaches the remote service: the base endpoint,
//! request timeout, read retry policy and which backend implementation to
//! use.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Port the development service listens on.
pub const DEFAULT_PORT: u16 = 3001;

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Errors raised by invalid settings values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The base endpoint override is not an absolute http(s) URL.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    /// Unknown platform name.
    #[error("unknown platform: {0} (expected android, ios, web or desktop)")]
    UnknownPlatform(String),

    /// Unknown backend name.
    #[error("unknown backend: {0} (expected http or memory)")]
    UnknownBackend(String),

    /// Timeout must be a positive number of milliseconds.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Target the client runs on.
///
/// Only matters when no base endpoint override is set: the Android
/// emulator reaches the host machine through `10.0.2.2`, everything else
/// through `localhost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Android emulator.
    Android,
    /// iOS simulator.
    Ios,
    /// Browser build.
    Web,
    /// Native desktop or test host (default).
    #[default]
    Desktop,
}

impl Platform {
    /// Loopback host that reaches the development machine.
    #[must_use]
    pub const fn loopback_host(self) -> &'static str {
        match self {
            Self::Android => "10.0.2.2",
            Self::Ios | Self::Web | Self::Desktop => "localhost",
        }
    }

    /// Default base endpoint for this platform.
    #[must_use]
    pub fn default_base_url(self) -> String {
        format!("http://{}:{DEFAULT_PORT}", self.loopback_host())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
            Self::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "web" => Ok(Self::Web),
            "desktop" => Ok(Self::Desktop),
            _ => Err(SettingsError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Which `RemoteService` implementation the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real service over HTTP (default).
    #[default]
    Http,
    /// In-process fake seeded with placeholder posts.
    Memory,
}

impl FromStr for BackendKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            _ => Err(SettingsError::UnknownBackend(s.to_string())),
        }
    }
}

/// Connection settings for the client core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    /// Explicit base endpoint; takes priority over the platform default.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Target platform, used for the default endpoint.
    #[serde(default)]
    pub platform: Platform,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry a feed load once when it times out.
    #[serde(default = "default_retry_reads_on_timeout")]
    pub retry_reads_on_timeout: bool,

    /// Remote service implementation.
    #[serde(default)]
    pub backend: BackendKind,
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_retry_reads_on_timeout() -> bool {
    true
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            platform: Platform::default(),
            timeout_ms: default_timeout_ms(),
            retry_reads_on_timeout: default_retry_reads_on_timeout(),
            backend: BackendKind::default(),
        }
    }
}

impl ClientSettings {
    /// Resolves the base endpoint: override first, then platform default.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or_else(|| self.platform.default_base_url(), str::to_string)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks that the override URL and timeout are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] if the resolved base endpoint is
    /// not an http(s) URL, or [`SettingsError::InvalidTimeout`] for a zero
    /// timeout.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_ms == 0 {
            return Err(SettingsError::InvalidTimeout("0".to_string()));
        }

        let base = self.base_url();
        let parsed =
            Url::parse(&base).map_err(|e| SettingsError::InvalidUrl(format!("{e}: {base}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidUrl(base));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.platform, Platform::Desktop);
        assert_eq!(settings.backend, BackendKind::Http);
        assert_eq!(settings.timeout_ms, 15_000);
        assert!(settings.retry_reads_on_timeout);
        assert_eq!(settings.base_url(), "http://localhost:3001");
    }

    #[test]
    fn android_uses_emulator_loopback() {
        let settings = ClientSettings {
            platform: Platform::Android,
            ..ClientSettings::default()
        };
        assert_eq!(settings.base_url(), "http://10.0.2.2:3001");
    }

    #[test]
    fn override_wins_over_platform() {
        let settings = ClientSettings {
            api_url: Some("https://api.example.com".to_string()),
            platform: Platform::Android,
            ..ClientSettings::default()
        };
        assert_eq!(settings.base_url(), "https://api.example.com");
    }

    #[test]
    fn blank_override_is_ignored() {
        let settings = ClientSettings {
            api_url: Some("  ".to_string()),
            platform: Platform::Ios,
            ..ClientSettings::default()
        };
        assert_eq!(settings.base_url(), "http://localhost:3001");
    }

    #[test]
    fn validate_rejects_bad_url_and_timeout() {
        let settings = ClientSettings {
            api_url: Some("ftp://example.com".to_string()),
            ..ClientSettings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidUrl(_))));

        let settings = ClientSettings {
            timeout_ms: 0,
            ..ClientSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidTimeout(_))
        ));

        assert_eq!(ClientSettings::default().validate(), Ok(()));
    }

    #[test]
    fn parses_platform_and_backend_names() {
        assert_eq!("Android".parse::<Platform>(), Ok(Platform::Android));
        assert_eq!(" web ".parse::<Platform>(), Ok(Platform::Web));
        assert!("symbian".parse::<Platform>().is_err());
        assert_eq!("memory".parse::<BackendKind>(), Ok(BackendKind::Memory));
        assert!("grpc".parse::<BackendKind>().is_err());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let json = r#"{"apiUrl":"http://127.0.0.1:9000","platform":"ios"}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(settings.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(settings.platform, Platform::Ios);
        assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
