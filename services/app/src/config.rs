//! services/app/src/config.rs
//!
//! Configuration for the client, loaded from environment variables.

use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directory holding the persisted session ("local storage").
    pub state_dir: PathBuf,
    pub log_level: Level,
    /// Root of a running api server. Unset means the app embeds its own
    /// seeded backend in-process.
    pub api_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let state_dir = std::env::var("APP_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.app-state"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let api_base_url = std::env::var("API_BASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &api_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(
                    "API_BASE_URL".to_string(),
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        Ok(Self {
            state_dir,
            log_level,
            api_base_url,
        })
    }
}
