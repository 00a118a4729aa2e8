//! Error type shared by the console client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    /// Server-supplied message of a failed request, raised when the caller
    /// asked for errors to be thrown.
    #[error("{0}")]
    Api(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("WebSocket error: {0}")]
    WebSocket(String),
    #[error("Invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),
}
