//! Configuration management for the SWOT engine.
//!
//! The service reads a single configuration file at
//! `~/.swot-engine/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables (SWOT_* prefix)
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SWOT_BIND_ADDRESS` → server.host
//! - `SWOT_PORT` → server.port
//! - `SWOT_PROVIDER` → provider.kind
//! - `SWOT_MODEL` → provider.model
//! - `SWOT_BASE_URL` → provider.base_url
//! - `OPENAI_API_KEY` → provider.api_key
//! - `SWOT_DATA_DIR` → storage.data_dir
//! - `SWOT_LOG_LEVEL` → observability.log_level
//! - `SWOT_LOG_FORMAT` → observability.log_format
//!
//! The loaded `Config` is threaded explicitly into the service at startup;
//! nothing in this crate holds process-wide configuration state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".swot-engine"),
        |dirs| dirs.home_dir().join(".swot-engine"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only).
    /// Set to "0.0.0.0" for remote access.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number for the service.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4500
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Language-model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind: "openai" or "ollama".
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    /// Model name passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (required for "openai"; unused for "ollama").
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override (Azure/compatible endpoints, or a non-default
    /// Ollama host).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum tokens per structuring response.
    #[serde(default)]
    pub max_tokens: Option<i64>,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            model: default_model(),
            api_key: None,
            base_url: None,
            max_tokens: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider_kind() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_timeout_secs() -> u64 {
    120
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Flat-file run storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for per-run JSON files and the shared CSV log.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// CSV log file name inside `data_dir`.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl StorageConfig {
    /// Full path to the CSV log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_file: default_log_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("swot_data")
}

fn default_log_file() -> String {
    "swot_runs.csv".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "json" or "pretty".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the SWOT engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Language-model provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Run storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path with env overrides applied.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::info!("Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("SWOT_BIND_ADDRESS") {
            self.server.host = bind;
        }
        if let Ok(port) = std::env::var("SWOT_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(kind) = std::env::var("SWOT_PROVIDER") {
            self.provider.kind = kind;
        }
        if let Ok(model) = std::env::var("SWOT_MODEL") {
            self.provider.model = model;
        }
        if let Ok(url) = std::env::var("SWOT_BASE_URL") {
            self.provider.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.provider.api_key = Some(key);
        }

        if let Ok(dir) = std::env::var("SWOT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Ok(level) = std::env::var("SWOT_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("SWOT_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4500);
        assert_eq!(config.provider.kind, "openai");
        assert_eq!(config.storage.data_dir, PathBuf::from("swot_data"));
        assert_eq!(
            config.storage.log_path(),
            PathBuf::from("swot_data").join("swot_runs.csv")
        );
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "server": { "port": 9000 }, "provider": { "kind": "ollama" } }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.provider.kind, "ollama");
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.server.port, config.server.port);
        assert_eq!(back.provider.model, config.provider.model);
    }
}
