//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset or empty variables fall
//! back to development defaults, malformed ones fail fast.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use equipstock_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_LOCATION_SERVICE_URL: &str = "http://localhost:8003/api/locations";
pub const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

/// Where and how to reach the external location service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationServiceConfig {
    /// Base URL; a location is fetched from `{base_url}/{id}`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LocationServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LOCATION_SERVICE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_LOCATION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub location: LocationServiceConfig,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map instead of the
    /// process environment).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let base_url =
            get("LOCATION_SERVICE_URL").unwrap_or_else(|| DEFAULT_LOCATION_SERVICE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError {
                var: "LOCATION_SERVICE_URL",
                reason: format!("'{base_url}' is not an http(s) URL"),
            });
        }

        let timeout_secs = match get("LOCATION_SERVICE_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError {
                var: "LOCATION_SERVICE_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_LOCATION_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError {
                var: "LOCATION_SERVICE_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError {
                var: "LOG_FORMAT",
                reason: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            location: LocationServiceConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            log_format,
        })
    }
}
