//! Private HTTP transport for backend polling
//!
//! This crate provides the single request/response exchange the pollers are
//! built on. The [`Transport`] trait is the seam: production code uses the
//! reqwest-backed [`HttpTransport`], tests plug in scripted implementations.

mod error;

pub use error::TransportError;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

/// Default timeout for establishing a connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for a whole request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A single GET request/response exchange
///
/// Implementations are shared read-only by every poller, so they must be
/// stateless with respect to individual requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url`, failing on network errors and non-2xx statuses
    async fn get(&self, url: &str) -> Result<Bytes, TransportError>;

    /// Release the transport. Later requests fail with [`TransportError::Closed`].
    fn close(&self);

    /// Whether [`Transport::close`] has been called
    fn is_closed(&self) -> bool;
}

/// A minimal HTTP transport backed by a pooled reqwest client
///
/// Closing drops the client, which closes every pooled connection once
/// in-flight requests finish.
#[derive(Debug)]
pub struct HttpTransport {
    client: RwLock<Option<reqwest::Client>>,
}

impl HttpTransport {
    /// Create a transport with the default timeouts
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with explicit connect and request timeouts
    pub fn with_timeouts(
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client: RwLock::new(Some(client)),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Bytes, TransportError> {
        let client = self.client.read().clone().ok_or(TransportError::Closed)?;

        tracing::trace!(url, "GET");
        let response = client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?)
    }

    fn close(&self) {
        if self.client.write().take().is_some() {
            tracing::debug!("HTTP transport closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.client.read().is_none()
    }
}
