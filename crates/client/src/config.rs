//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SANDBAR_API_BASE_URL` - Base URL of the catalog/checkout service
//!   (default: `http://127.0.0.1:8000`)
//! - `SANDBAR_API_VERSION` - API version, `v1` or `v2` (default: `v1`)
//! - `SANDBAR_SCENARIO` - Debug scenario tag sent as the `X-Scenario` header
//! - `SANDBAR_INJECT_LATENCY` - Add artificial delays before requests
//!   (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors that can occur during loading or updates.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Unknown API version string.
#[derive(Debug, Error, Clone)]
#[error("unknown API version: {0} (expected v1 or v2)")]
pub struct InvalidApiVersion(String);

/// Version of the remote API to talk to.
///
/// Both versions expose the same catalog and checkout operations under
/// different path prefixes; which one is used is configuration-driven,
/// never hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    /// The version segment as it appears in request paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// Path of the catalog listing endpoint.
    #[must_use]
    pub fn catalog_path(self) -> String {
        format!("/api/{}/catalog", self.as_str())
    }

    /// Path of the checkout submission endpoint.
    #[must_use]
    pub fn checkout_path(self) -> String {
        format!("/api/{}/checkout", self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = InvalidApiVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            other => Err(InvalidApiVersion(other.to_owned())),
        }
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client configuration.
///
/// Lifecycle: loaded at startup, may be changed at runtime through
/// [`Settings`], read on every API call.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the catalog/checkout service, without a trailing slash.
    pub base_url: String,
    /// Which API version's paths to use.
    pub api_version: ApiVersion,
    /// Debug scenario tag sent as the `X-Scenario` header when set.
    pub scenario: Option<String>,
    /// Add artificial delays before requests (demo instrumentation only).
    pub inject_latency: bool,
    /// Sentry DSN for error tracking, consumed by the binary at startup.
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Default base URL pointing at a locally running backend.
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000";

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL does not parse or the API
    /// version is not `v1`/`v2`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = normalize_base_url(&get_env_or_default(
            "SANDBAR_API_BASE_URL",
            Self::DEFAULT_BASE_URL,
        ))?;
        let api_version = get_env_or_default("SANDBAR_API_VERSION", "v1")
            .parse::<ApiVersion>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SANDBAR_API_VERSION".to_owned(), e.to_string())
            })?;
        let scenario = get_optional_env("SANDBAR_SCENARIO");
        let inject_latency = parse_bool(&get_env_or_default("SANDBAR_INJECT_LATENCY", "false"))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SANDBAR_INJECT_LATENCY".to_owned(), e)
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            base_url,
            api_version,
            scenario,
            inject_latency,
            sentry_dsn,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            api_version: ApiVersion::default(),
            scenario: None,
            inject_latency: false,
            sentry_dsn: None,
        }
    }
}

/// Handle to the shared, runtime-mutable client configuration.
///
/// Cheaply cloneable; writers are the developer-settings surface, the
/// reader is [`crate::ApiClient`], which takes a fresh [`Settings::snapshot`]
/// at every call.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    inner: Arc<RwLock<ClientConfig>>,
}

impl Settings {
    /// Wrap a configuration in a shared handle.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Load from environment variables and wrap in a shared handle.
    ///
    /// # Errors
    ///
    /// Propagates [`ClientConfig::from_env`] errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// A copy of the current configuration.
    #[must_use]
    pub fn snapshot(&self) -> ClientConfig {
        self.read().clone()
    }

    /// Point the client at a different backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `url` does not parse;
    /// the current value is kept in that case.
    pub fn set_base_url(&self, url: &str) -> Result<(), ConfigError> {
        let normalized = normalize_base_url(url)?;
        self.write().base_url = normalized;
        Ok(())
    }

    /// Switch the API version used for subsequent calls.
    pub fn set_api_version(&self, version: ApiVersion) {
        self.write().api_version = version;
    }

    /// Set or clear the debug scenario tag. Empty strings clear it.
    pub fn set_scenario(&self, scenario: Option<String>) {
        self.write().scenario = scenario.filter(|s| !s.is_empty());
    }

    /// Toggle artificial request latency.
    pub fn set_inject_latency(&self, on: bool) {
        self.write().inject_latency = on;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ClientConfig> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ClientConfig> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Validate a base URL and strip any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    url::Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    Ok(raw.trim_end_matches('/').to_owned())
}

/// Get an optional environment variable; empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a boolean environment value.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_paths() {
        assert_eq!(ApiVersion::V1.catalog_path(), "/api/v1/catalog");
        assert_eq!(ApiVersion::V2.catalog_path(), "/api/v2/catalog");
        assert_eq!(ApiVersion::V1.checkout_path(), "/api/v1/checkout");
        assert_eq!(ApiVersion::V2.checkout_path(), "/api/v2/checkout");
    }

    #[test]
    fn test_api_version_from_str() {
        assert_eq!("v1".parse::<ApiVersion>().unwrap(), ApiVersion::V1);
        assert_eq!("V2".parse::<ApiVersion>().unwrap(), ApiVersion::V2);
        assert!("v3".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_normalize_base_url_strips_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/").unwrap(),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_settings_snapshot_sees_updates() {
        let settings = Settings::new(ClientConfig::default());
        assert_eq!(settings.snapshot().api_version, ApiVersion::V1);

        settings.set_api_version(ApiVersion::V2);
        settings.set_scenario(Some("black-friday".to_owned()));
        let snapshot = settings.snapshot();
        assert_eq!(snapshot.api_version, ApiVersion::V2);
        assert_eq!(snapshot.scenario.as_deref(), Some("black-friday"));
    }

    #[test]
    fn test_settings_empty_scenario_clears() {
        let settings = Settings::new(ClientConfig::default());
        settings.set_scenario(Some(String::new()));
        assert!(settings.snapshot().scenario.is_none());
    }

    #[test]
    fn test_settings_bad_base_url_keeps_current() {
        let settings = Settings::new(ClientConfig::default());
        assert!(settings.set_base_url("not a url").is_err());
        assert_eq!(settings.snapshot().base_url, ClientConfig::DEFAULT_BASE_URL);
    }
}
