//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at {0}")]
    AlreadyExists(String),
}
