use http_client::TransportError;
use thiserror::Error;

/// High-level API errors for backend fetches
///
/// Pollers treat every variant the same way (the resource's failure policy
/// decides what happens next); one-shot callers can tell them apart.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response body
    ///
    /// Covers connection failures, timeouts, non-2xx statuses and requests
    /// issued after the transport was closed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered, but the payload did not match the model
    #[error("Failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot be used to build request URLs
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
