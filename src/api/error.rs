//! REST client error types
//!
//! Maps transport and decoding failures onto the two failure kinds the
//! dashboard distinguishes: network failures and parse failures.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::Endpoint;

/// Errors returned by the sentiment API client
#[derive(Error, Debug)]
pub enum FetchError {
    /// Could not connect to the API
    #[error("API unavailable: {0}")]
    Unavailable(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Any other transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error {status} from {endpoint}: {message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    /// The body was not JSON or did not match the expected shape
    #[error("Invalid response from {endpoint}: {source}")]
    Parse {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure taxonomy shown in logs and load outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Request rejected, timed out, or answered with a non-success status
    Network,
    /// Body not JSON or schema mismatch
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network failure"),
            FailureKind::Parse => write!(f, "parse failure"),
        }
    }
}

impl FetchError {
    /// Classify a send error as timeout, unreachable, or other transport failure
    pub(crate) fn from_send(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else if err.is_connect() {
            FetchError::Unavailable(url.to_string())
        } else {
            FetchError::Request(err)
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Parse { .. } => FailureKind::Parse,
            FetchError::Request(e) if e.is_decode() => FailureKind::Parse,
            _ => FailureKind::Network,
        }
    }
}

/// Result type for API operations
pub type FetchResult<T> = Result<T, FetchError>;
