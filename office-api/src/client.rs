use std::sync::Arc;

use http_client::Transport;
use serde::de::DeserializeOwned;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::{ApiError, Result};
use crate::model::{AgentMessage, Alert, EnvironmentState, RoomHeatingResponse, RoomId};

/// Default backend address of the simulation service
pub const DEFAULT_BASE_URL: &str = "http://0.0.0.0:8080";

/// Typed one-shot fetches against the simulation backend
///
/// Every method performs exactly one request and propagates failures.
/// Swallowing errors is the job of the pollers' failure policies, not of
/// this client. Cloning is cheap and shares the transport.
#[derive(Clone)]
pub struct EnvironmentApi {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl EnvironmentApi {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        // Reject cannot-be-a-base URLs up front rather than on the first poll
        Endpoint::EnvironmentState.url(&base_url)?;

        Ok(Self {
            transport,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn get_environment_state(&self) -> Result<EnvironmentState> {
        self.fetch(Endpoint::EnvironmentState).await
    }

    pub async fn get_alerts(&self) -> Result<Vec<Alert>> {
        self.fetch(Endpoint::Alerts).await
    }

    pub async fn get_messages(&self) -> Result<Vec<AgentMessage>> {
        self.fetch(Endpoint::AgentMessages).await
    }

    pub async fn get_room_heating(&self, room_id: &RoomId) -> Result<RoomHeatingResponse> {
        self.fetch(Endpoint::RoomHeating(room_id.clone())).await
    }

    /// Release the underlying transport; every later fetch fails
    pub fn close(&self) {
        self.transport.close();
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let url = endpoint.url(&self.base_url)?;
        let body = self.transport.get(url.as_str()).await?;

        serde_json::from_slice(&body).map_err(|source| {
            tracing::debug!(endpoint = endpoint.name(), bytes = body.len(), error = %source, "Malformed payload");
            ApiError::Decode {
                endpoint: endpoint.name(),
                source,
            }
        })
    }
}

impl std::fmt::Debug for EnvironmentApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentApi")
            .field("base_url", &self.base_url.as_str())
            .field("closed", &self.transport.is_closed())
            .finish()
    }
}
