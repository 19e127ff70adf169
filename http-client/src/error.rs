//! Error types for the HTTP transport

use thiserror::Error;

/// Errors that can occur during a single request/response exchange
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS or body read failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The backend answered with a non-2xx status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The transport was closed by its owner
    #[error("Transport is closed")]
    Closed,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}
