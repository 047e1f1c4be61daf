//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Clash Royale API, including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum upstream calls per second, process-wide
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.clashroyale.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "CLASH_ROYALE_API_KEY".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            requests_per_second: default_requests_per_second(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Minimum spacing between two upstream calls.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(1) / self.requests_per_second.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Read the credential from the configured environment variable.
    ///
    /// Surrounding whitespace is trimmed. A missing variable yields an empty
    /// token; the upstream service rejects such requests, not the client.
    pub fn api_key(&self) -> String {
        std::env::var(&self.api_key_env)
            .map(|key| key.trim().to_string())
            .unwrap_or_default()
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.requests_per_second == 0 {
            return Err(ConfigError::ValidationError(
                "API requests_per_second must be greater than 0".to_string(),
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "API base_url is not a valid URL: {}",
                self.api.base_url
            )));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
