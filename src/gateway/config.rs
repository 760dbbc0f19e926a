//! Gateway configuration.
//!
//! This module provides configuration management for the search gateway:
//! where the proxy listens, which provider it calls, and how it logs. The
//! provider credential itself is never stored here, only the name of the
//! environment variable it is read from on each request.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::provider::brave::{BRAVE_API_URL, DEFAULT_RESULT_COUNT};
use crate::proxy::credentials::DEFAULT_API_KEY_ENV;

/// Default request body limit, matching axum's own default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Largest page size the provider accepts.
pub const MAX_RESULT_COUNT: u32 = 20;

/// Gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Search provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route the search function is mounted on
    #[serde(default = "default_path")]
    pub path: String,

    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Web search endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Results requested per search
    #[serde(default = "default_result_count")]
    pub result_count: u32,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/functions/v1/search".to_string()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_endpoint() -> String {
    BRAVE_API_URL.to_string()
}

fn default_result_count() -> u32 {
    DEFAULT_RESULT_COUNT
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            result_count: default_result_count(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(path)) => {
                tracing::debug!("No config file at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Note: port 0 is valid - it means "let the OS assign a port"

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "server.path".to_string(),
                reason: "Route must start with '/'".to_string(),
            });
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.max_body_bytes".to_string(),
                reason: "Body limit must be greater than zero".to_string(),
            });
        }

        if !(self.provider.endpoint.starts_with("https://")
            || self.provider.endpoint.starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue {
                key: "provider.endpoint".to_string(),
                reason: "Endpoint must be an http(s) URL".to_string(),
            });
        }

        if self.provider.result_count == 0 || self.provider.result_count > MAX_RESULT_COUNT {
            return Err(ConfigError::InvalidValue {
                key: "provider.result_count".to_string(),
                reason: format!("Result count must be between 1 and {}", MAX_RESULT_COUNT),
            });
        }

        if self.provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "provider.api_key_env".to_string(),
                reason: "Environment variable name must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Create a configuration for testing.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // OS will assign a port
                path: default_path(),
                max_body_bytes: default_max_body_bytes(),
            },
            ..Default::default()
        }
    }
}
