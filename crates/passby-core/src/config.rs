//! Configuration for the relay server
//!
//! Supports TOML configuration files with sensible defaults.
//! Configuration is loaded from:
//! - macOS: ~/Library/Application Support/com.passby.passby-relay/config.toml
//! - Linux: ~/.config/passby-relay/config.toml
//! - Windows: %APPDATA%/passby/passby-relay/config/config.toml

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::{DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS};

/// Upper bound on the token TTL (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Token lifetime settings
    pub tokens: TokenConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port
    pub port: u16,
    /// Bind address
    pub bind: IpAddr,
    /// Allowed CORS origins (empty = any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            cors_origins: Vec::new(),
        }
    }
}

/// Token lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Entry time-to-live in seconds
    pub ttl_secs: u64,
    /// Background sweep period in seconds (0 = expire on reads only)
    pub sweep_interval_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            sweep_interval_secs: 0,
        }
    }
}

impl RelayConfig {
    /// Load configuration from the default path
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Failed to load config from {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            None => {
                debug!("No config directory found, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: RelayConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "passby", "passby-relay")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind, self.server.port)
    }

    /// Token TTL as a duration
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.tokens.ttl_secs.min(MAX_TTL_SECS) as i64)
    }

    /// Generate a sample configuration file content
    pub fn sample() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.tokens.ttl_secs, 1800);
        assert_eq!(config.tokens.sweep_interval_secs, 0);
        assert_eq!(config.token_ttl(), Duration::minutes(30));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [server]
            port = 8088
            bind = "127.0.0.1"
        "#;
        let config: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8088");
        // Other values should be defaults
        assert_eq!(config.tokens.ttl_secs, 1800);
        assert!(config.server.cors_origins.is_empty());
    }

    #[test]
    fn test_sample_config() {
        let sample = RelayConfig::sample();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[tokens]"));
        assert!(sample.contains("ttl_secs = 1800"));
    }

    #[test]
    fn test_config_load_missing() {
        let config = RelayConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = RelayConfig::default();
        config.server.port = 9100;
        config.tokens.ttl_secs = 60;
        config.server.cors_origins = vec!["https://example.com".into()];
        config.save_to(&path).unwrap();

        let loaded = RelayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.token_ttl(), Duration::seconds(60));
        assert_eq!(loaded.server.cors_origins, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_config_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        assert!(matches!(
            RelayConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
