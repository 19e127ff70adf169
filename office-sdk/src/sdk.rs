use std::sync::Arc;

use http_client::Transport;
use office_state::{OfficeSnapshot, ViewModel};

use crate::client::SyncClient;
use crate::config::SyncConfig;
use crate::error::{Result, SdkError};

/// A sync client with a view model already bound to it
///
/// This is the usual entry point for a dashboard: start it, then read
/// [`snapshot`](Self::snapshot) or await changes on [`view`](Self::view).
#[derive(Debug)]
pub struct OfficeSdk {
    client: SyncClient,
    view: ViewModel,
}

impl OfficeSdk {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let client = SyncClient::new(config)?;
        Ok(Self::from_client(client))
    }

    pub fn with_transport(config: SyncConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let client = SyncClient::with_transport(config, transport)?;
        Ok(Self::from_client(client))
    }

    fn from_client(client: SyncClient) -> Self {
        let view = ViewModel::with_change_buffer(client.config().change_buffer_size);
        Self { client, view }
    }

    /// Bind the view model and start polling
    pub fn start(&self) -> Result<()> {
        if self.client.is_shut_down() {
            return Err(SdkError::ShutDown);
        }
        if !self.client.is_running() {
            self.view.bind(self.client.view_sources());
        }
        self.client.start()
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn snapshot(&self) -> OfficeSnapshot {
        self.view.snapshot()
    }

    /// Stop polling; the view keeps its last values
    pub async fn shutdown(&self) -> Result<()> {
        let result = self.client.shutdown().await;
        self.view.unbind();
        result
    }
}
