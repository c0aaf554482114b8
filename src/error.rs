//! Error types for the API client and its decode/format layer.

use crate::format::FormatError;
use thiserror::Error;

/// Errors surfaced by API calls and response handling.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Connection refused, timeout, TLS failure and similar.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("An error occurred. Error: {message}, API status code: {code}")]
    Status { code: u16, message: String },

    /// No line of a streamed response could be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A table response violated the `{columns, rows}` contract.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
