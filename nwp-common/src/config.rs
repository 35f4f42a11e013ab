//! Bootstrap configuration loading and data directory resolution
//!
//! Configuration sources, highest priority first:
//! 1. Command-line argument (or its environment variable fallback)
//! 2. TOML config file
//! 3. OS-dependent compiled default
//!
//! A missing config file is not an error: defaults are used and a warning
//! is logged. A config file that exists but cannot be parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for the player service
pub const DEFAULT_PORT: u16 = 5750;

/// Default base URL of the music API server
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. Everything mutable at
/// runtime lives in the database `settings` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the track/lyrics/radio API server
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Session cookie forwarded to the API server (optional)
    #[serde(default)]
    pub api_cookie: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            api_base_url: default_api_base_url(),
            api_cookie: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string (e.g. "info" or "nwp_player=debug")
    ///
    /// None means the binary's built-in filter is used.
    #[serde(default)]
    pub level: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_database_path() -> PathBuf {
    default_data_dir().join("nwp.db")
}

/// Get OS-dependent default data directory
///
/// `<data_local_dir>/nwp`, falling back to `./nwp_data` when the platform
/// exposes no data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nwp"))
        .unwrap_or_else(|| PathBuf::from("./nwp_data"))
}

/// Get default configuration file path for the platform
///
/// `<config_dir>/nwp/config.toml`; None if the platform has no config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nwp").join("config.toml"))
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from an explicit path, or the platform default
    ///
    /// Missing file → defaults + warning. Unreadable or invalid file → error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("No platform config directory; using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file {} not found; using built-in defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

