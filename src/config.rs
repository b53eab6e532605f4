//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::opendota::OpenDotaConfig as ClientConfig;
use crate::player::AccountLinks;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Player used when none is given on the command line
    #[serde(default)]
    pub default_player: Option<String>,

    #[serde(default)]
    pub opendota: OpenDotaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Linked accounts: name or chat user id -> steam id
    #[serde(default)]
    pub accounts: HashMap<String, u64>,
}

/// OpenDota API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenDotaConfig {
    #[serde(default = "default_opendota_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_opendota_url() -> String {
    "https://api.opendota.com/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for OpenDotaConfig {
    fn default() -> Self {
        Self {
            base_url: default_opendota_url(),
            api_key: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl OpenDotaConfig {
    /// Settings for the HTTP client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout_ms: self.request_timeout_secs * 1000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default config file locations, most specific last
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("dotafilter").join("config.toml")),
            Some(PathBuf::from("./dotafilter.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths().iter().rev() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Account links for player resolution
    pub fn account_links(&self) -> AccountLinks {
        AccountLinks::new(&self.accounts, self.default_player.clone())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(player) = var("DOTAFILTER_DEFAULT_PLAYER") {
            self.default_player = Some(player);
        }

        // OpenDota overrides
        if let Some(url) = var("DOTAFILTER_OPENDOTA_URL") {
            self.opendota.base_url = url;
        }
        if let Some(key) = var("DOTAFILTER_API_KEY") {
            self.opendota.api_key = Some(key);
        }
        if let Some(timeout) = var("DOTAFILTER_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.opendota.request_timeout_secs = secs;
            }
        }

        // Logging overrides
        if let Some(level) = var("DOTAFILTER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DOTAFILTER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Dotafilter Configuration
#
# Environment variables override these settings:
# - DOTAFILTER_DEFAULT_PLAYER
# - DOTAFILTER_OPENDOTA_URL
# - DOTAFILTER_API_KEY
# - DOTAFILTER_REQUEST_TIMEOUT
# - DOTAFILTER_LOG_LEVEL
# - DOTAFILTER_LOG_FORMAT

# Player to use when --player is not given.
# Any player reference works: account id, steam id, profile URL or a linked name.
# default_player = "86745912"

[opendota]
# OpenDota API URL
base_url = "https://api.opendota.com/api"

# Optional API key (raises rate limits)
# api_key = ""

# Request timeout in seconds
request_timeout_secs = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

[accounts]
# Linked accounts: name (or chat user id) = steam id
# Both 32-bit account ids and 64-bit steam ids are accepted.
# dendi = 70388657
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_template_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.opendota.base_url, "https://api.opendota.com/api");
        assert_eq!(config.opendota.request_timeout_secs, 10);
        assert_eq!(config.logging.level, "warn");
        assert!(config.accounts.is_empty());
        assert!(config.default_player.is_none());
    }

    #[test]
    fn test_parse_accounts() {
        let config = Config::parse(
            r#"
            default_player = "dendi"

            [accounts]
            dendi = 70388657
            "123456" = 76561198047011640
            "#,
        )
        .unwrap();

        let links = config.account_links();
        assert_eq!(links.lookup("Dendi"), Some(70388657));
        assert_eq!(links.lookup("123456"), Some(86745912));
        assert_eq!(links.default_player(), Some("dendi"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[opendota]\napi_key = \"abc\"\nrequest_timeout_secs = 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.opendota.api_key.as_deref(), Some("abc"));

        let client = config.opendota.client_config();
        assert_eq!(client.request_timeout_ms, 3000);
        assert_eq!(client.base_url, "https://api.opendota.com/api");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[opendota\n").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let vars: HashMap<&str, &str> = [
            ("DOTAFILTER_API_KEY", "key"),
            ("DOTAFILTER_REQUEST_TIMEOUT", "not a number"),
            ("DOTAFILTER_LOG_FORMAT", "json"),
            ("DOTAFILTER_DEFAULT_PLAYER", "86745912"),
        ]
        .into_iter()
        .collect();

        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.opendota.api_key.as_deref(), Some("key"));
        assert_eq!(config.opendota.request_timeout_secs, 10);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.default_player.as_deref(), Some("86745912"));
    }
}
