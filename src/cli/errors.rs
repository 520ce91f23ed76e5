//! CLI-specific error types
//!
//! All CLI errors end the process with exit code 1.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::PageError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn argument(msg: impl Into<String>) -> Self {
        CliError::Argument(msg.into())
    }

    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "PAGINATE_CLI_CONFIG_ERROR",
            CliError::Page(err) => err.code(),
            CliError::Database(_) => "PAGINATE_CLI_DATABASE_ERROR",
            CliError::Argument(_) => "PAGINATE_CLI_ARGUMENT_ERROR",
            CliError::Io(_) | CliError::Json(_) => "PAGINATE_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
