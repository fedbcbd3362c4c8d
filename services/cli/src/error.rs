//! services/cli/src/error.rs
//!
//! Defines the primary error type for the entire CLI service.

use crate::config::ConfigError;
use classdocs_core::ports::PortError;

/// The primary error type for the `cli` service.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
