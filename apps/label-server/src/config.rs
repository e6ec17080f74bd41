//! Label server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Label settings themselves live in [`saree_labels::LabelConfig`].

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Label server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind: String,

    /// HTTP port
    pub port: u16,

    /// Path of the labels.toml file (platform default when absent)
    pub label_config_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            bind: env::var("LABEL_SERVER_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("LABEL_SERVER_PORT")
                .unwrap_or_else(|_| "8787".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LABEL_SERVER_PORT".to_string()))?,

            label_config_path: env::var("SAREE_LABEL_CONFIG").ok().map(PathBuf::from),
        };

        if config.bind.trim().is_empty() {
            return Err(ConfigError::InvalidValue("LABEL_SERVER_BIND".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            bind: "127.0.0.1".to_string(),
            port: 8787,
            label_config_path: None,
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8787");
    }
}
