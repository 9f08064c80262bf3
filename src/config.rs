//! Configuration
//!
//! Layered settings for the synchronizer: built-in defaults, the global
//! config file, the workspace file and `GRAPHSYNC__*` environment overrides,
//! merged with the `config` crate.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use crate::logging::LoggingConfig;
pub use facade::ConfigLoader;

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:3002";
pub const DEFAULT_TENANT_ID: &str = "default";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.remote.validate()
    }
}

/// Control-plane connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the management API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,

    /// Sent as a bearer token when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            tenant_id: default_tenant_id(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        let url = reqwest::Url::parse(&self.api_url).map_err(|e| {
            ApiError::ConfigError(format!("Invalid api_url '{}': {}", self.api_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApiError::ConfigError(format!(
                "api_url must be an http(s) URL with a host: {}",
                self.api_url
            )));
        }
        if self.tenant_id.trim().is_empty() {
            return Err(ApiError::ConfigError("tenant_id cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::ConfigError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SyncConfig::default();
        assert_eq!(config.remote.api_url, "http://localhost:3002");
        assert_eq!(config.remote.tenant_id, "default");
        assert_eq!(config.remote.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_remote_settings() {
        let bad_scheme = RemoteConfig {
            api_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(bad_scheme.validate().is_err());

        let empty_tenant = RemoteConfig {
            tenant_id: "  ".into(),
            ..Default::default()
        };
        assert!(empty_tenant.validate().is_err());

        let zero_timeout = RemoteConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [remote]
            tenant_id = "acme"
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.tenant_id, "acme");
        assert_eq!(config.remote.api_url, DEFAULT_API_URL);
        assert_eq!(config.logging.level, "info");
    }
}
