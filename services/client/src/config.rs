//! services/client/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the remote recipe/user collections. When unset, the
    /// offline directory-backed store is used instead.
    pub api_base_url: Option<String>,
    /// Directory for the local key/value store (session pointer, engagement
    /// counters, recent searches, offline records).
    pub data_dir: PathBuf,
    pub log_level: Level,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure tests
    /// are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let api_base_url = std::env::var("API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let http_timeout = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "HTTP_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a number of seconds", raw),
                    )
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(15),
        };

        Ok(Self {
            api_base_url,
            data_dir,
            log_level,
            http_timeout,
        })
    }
}
