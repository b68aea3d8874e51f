//! Service configuration
//!
//! Configuration is loaded from a TOML file with kebab-case keys. Every
//! field has a default, so the service also starts without a config file.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure for Shelf-Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(rename = "listen-addr", default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Outbound fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User agent sent with every product page request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_user_agent() -> String {
    format!("shelf-scout/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Parsed listen address from the server section
    pub fn listen_addr(&self) -> ConfigResult<SocketAddr> {
        self.server.listen_addr.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "listen-addr is not a socket address: {}",
                self.server.listen_addr
            ))
        })
    }
}

/// Loads and validates configuration from a TOML file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - File could not be read, parsed, or validated
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let raw = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&raw)?;
    validate(&config)?;
    Ok(config)
}

/// Validates a configuration, whether loaded from file or built in code
pub fn validate(config: &Config) -> ConfigResult<()> {
    config.listen_addr()?;

    if config.fetcher.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent must not be empty".to_string(),
        ));
    }

    Ok(())
}
