//! Stream error types

use thiserror::Error;

/// Errors raised by the live update stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Invalid stream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Stream transport error: {0}")]
    Transport(String),

    #[error("Malformed stream message: {0}")]
    Malformed(String),

    #[error("Stream is not open")]
    NotOpen,
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
