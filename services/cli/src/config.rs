//! services/cli/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
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
    /// Root of the managed directory tree and the default database location.
    pub data_dir: PathBuf,
    pub database_url: String,
    pub log_level: Level,
    /// Absent until the operator provides one; generation commands check
    /// this before touching any state.
    pub openai_api_key: Option<String>,
    pub summary_model: String,
    pub quiz_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let data_dir = std::env::var("CLASSDOCS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        // The relational store defaults to a sqlite file inside the data
        // directory; `mode=rwc` creates it on first run.
        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "sqlite://{}?mode=rwc",
                data_dir.join("classdocs.db").display()
            )
        });

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Key (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let summary_model =
            std::env::var("SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let quiz_model = std::env::var("QUIZ_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            data_dir,
            database_url,
            log_level,
            openai_api_key,
            summary_model,
            quiz_model,
        })
    }
}
