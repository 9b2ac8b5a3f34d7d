// Configuration File Support
//
// Configuration for the admin console CLI.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from XDG config directory: ~/.config/evendating-admin/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_API_BASE_URL;
use crate::rate_limit::RateLimitConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Admin API configuration
    pub api: ApiConfig,

    /// Local state configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Client-side form limiters
    pub rate_limits: RateLimitConfig,
}

/// Admin API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API
    pub base_url: String,

    /// Request timeout in seconds (0, the default, waits indefinitely)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 0,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Local state configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// State file holding credentials and limiter windows
    /// (defaults to the platform data directory)
    pub state_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default XDG config directory
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    /// If the config file does not exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// Environment overrides are applied whether or not the file exists.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;
            tracing::debug!("Loaded configuration from {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        let config = config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/evendating-admin/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        match project_dirs() {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => home_dir().join(".config").join("evendating-admin").join("config.toml"),
        }
    }

    /// Resolved state file path
    pub fn state_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.state_path {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.data_dir().join("state.json"),
            None => home_dir()
                .join(".local")
                .join("share")
                .join("evendating-admin")
                .join("state.json"),
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - EVENDATING_API_BASE_URL
    /// - EVENDATING_API_TIMEOUT_SECS
    /// - EVENDATING_STATE_PATH
    /// - EVENDATING_LOG_LEVEL
    /// - EVENDATING_LOG_FORMAT
    fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("EVENDATING_API_BASE_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Some(timeout) = var("EVENDATING_API_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.api.timeout_secs = timeout;
            }
        }
        if let Some(path) = var("EVENDATING_STATE_PATH") {
            if !path.is_empty() {
                self.storage.state_path = Some(PathBuf::from(path));
            }
        }

        if let Some(level) = var("EVENDATING_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("EVENDATING_LOG_FORMAT") {
            self.logging.format = format;
        }

        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            ),
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!(
                "Invalid log format: {}. Must be one of: json, pretty, compact",
                self.logging.format
            ),
        }

        let base = self.api.base_url.trim();
        if !(base.starts_with("https://") || base.starts_with("http://")) {
            anyhow::bail!("API base URL must start with http:// or https://: {}", base);
        }

        if self.rate_limits.max_requests == 0 {
            anyhow::bail!("Rate limit max_requests must be > 0");
        }
        if self.rate_limits.window_secs == 0 {
            anyhow::bail!("Rate limit window_secs must be > 0");
        }
        for (key, over) in &self.rate_limits.overrides {
            if over.max_requests == Some(0) {
                anyhow::bail!("Rate limiter '{}' has max_requests = 0", key);
            }
            if over.window_secs == Some(0) {
                anyhow::bail!("Rate limiter '{}' has window_secs = 0", key);
            }
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .to_lowercase()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("us", "evendating", "evendating-admin")
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}
