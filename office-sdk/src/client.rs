//! The synchronization client
//!
//! [`SyncClient`] owns the transport and every poller. Each resource is
//! published on its own broadcast channel, so any number of consumers can
//! observe it independently:
//!
//! ```text
//! Transport ─┬─ state poller (1 s, skip) ──────────► state_tx ──┬─► observers
//!            │                                                  └─► room tracker
//!            ├─ alerts poller (2 s, fallback []) ───► alerts_tx        │ reconcile
//!            ├─ messages poller (2 s, fallback []) ─► messages_tx      ▼
//!            └─ heating supervisor (1 s per room, keep previous) ─► heating_tx
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use http_client::{HttpTransport, Transport};
use office_api::{
    AgentMessage, Alert, ApiError, EnvironmentApi, EnvironmentState, RoomHeatingResponse, RoomId,
};
use office_state::ViewSources;
use office_stream::{
    FailurePolicy, KeyedFetch, PollStream, PollerStats, PollerSupervisor, PollingTask,
    SupervisorError,
};

use crate::config::SyncConfig;
use crate::error::{Result, SdkError};

type HeatingSupervisor = PollerSupervisor<RoomId, RoomHeatingResponse, ApiError>;

/// Everything that exists only between `start()` and `shutdown()`
struct Running {
    pollers: Vec<PollingTask>,
    room_tracker: JoinHandle<std::result::Result<(), SupervisorError>>,
    heating: Arc<tokio::sync::Mutex<HeatingSupervisor>>,
}

impl Drop for Running {
    fn drop(&mut self) {
        self.room_tracker.abort();
    }
}

/// Polls the backend and publishes every resource as a stream
///
/// Subscribe with the `observe_*` methods before calling [`start`](Self::start)
/// to receive the first values. Call [`shutdown`](Self::shutdown) to stop
/// polling and release the transport; dropping the client only aborts the
/// tasks.
pub struct SyncClient {
    config: SyncConfig,
    api: EnvironmentApi,
    state_tx: broadcast::Sender<Arc<EnvironmentState>>,
    alerts_tx: broadcast::Sender<Arc<Vec<Alert>>>,
    messages_tx: broadcast::Sender<Arc<Vec<AgentMessage>>>,
    heating_tx: broadcast::Sender<RoomHeatingResponse>,
    running: Mutex<Option<Running>>,
    shut_down: AtomicBool,
}

impl SyncClient {
    /// Create a client with a reqwest-backed transport
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let transport =
            HttpTransport::with_timeouts(config.connect_timeout, config.request_timeout)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over any transport
    pub fn with_transport(config: SyncConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let api = EnvironmentApi::new(transport, &config.base_url)?;

        let capacity = config.change_buffer_size;
        Ok(Self {
            api,
            state_tx: broadcast::channel(capacity).0,
            alerts_tx: broadcast::channel(capacity).0,
            messages_tx: broadcast::channel(capacity).0,
            heating_tx: broadcast::channel(capacity).0,
            running: Mutex::new(None),
            shut_down: AtomicBool::new(false),
            config,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn api(&self) -> &EnvironmentApi {
        &self.api
    }

    /// Start every poller and the room tracker
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<()> {
        if self.is_shut_down() {
            return Err(SdkError::ShutDown);
        }

        let mut running = self.running.lock();
        if running.is_some() {
            return Err(SdkError::AlreadyStarted);
        }

        let heating = Arc::new(tokio::sync::Mutex::new(self.heating_supervisor()));
        // Subscribe before the state poller exists so the first snapshot is seen.
        let room_tracker = tokio::spawn(run_room_tracker(
            self.state_tx.subscribe(),
            Arc::clone(&heating),
        ));

        let pollers = vec![
            self.start_state_poller(),
            self.start_alerts_poller(),
            self.start_messages_poller(),
        ];

        tracing::info!(base_url = %self.api.base_url(), "Sync client started");
        *running = Some(Running {
            pollers,
            room_tracker,
            heating,
        });
        Ok(())
    }

    fn start_state_poller(&self) -> PollingTask {
        let api = self.api.clone();
        PollingTask::start(
            "state",
            move || {
                let api = api.clone();
                async move { api.get_environment_state().await.map(Arc::new) }
            },
            self.config.state_interval,
            FailurePolicy::SkipAndLog,
            self.state_tx.clone(),
        )
    }

    fn start_alerts_poller(&self) -> PollingTask {
        let api = self.api.clone();
        PollingTask::start(
            "alerts",
            move || {
                let api = api.clone();
                async move { api.get_alerts().await.map(Arc::new) }
            },
            self.config.alerts_interval,
            FailurePolicy::Fallback(Arc::new(Vec::new())),
            self.alerts_tx.clone(),
        )
    }

    fn start_messages_poller(&self) -> PollingTask {
        let api = self.api.clone();
        PollingTask::start(
            "messages",
            move || {
                let api = api.clone();
                async move { api.get_messages().await.map(Arc::new) }
            },
            self.config.messages_interval,
            FailurePolicy::Fallback(Arc::new(Vec::new())),
            self.messages_tx.clone(),
        )
    }

    fn heating_supervisor(&self) -> HeatingSupervisor {
        let api = self.api.clone();
        let fetch: KeyedFetch<RoomId, RoomHeatingResponse, ApiError> =
            Arc::new(move |room_id: &RoomId| {
                let api = api.clone();
                let room_id = room_id.clone();
                async move { api.get_room_heating(&room_id).await }.boxed()
            });

        PollerSupervisor::new(
            "heating",
            fetch,
            self.config.heating_interval,
            FailurePolicy::KeepPrevious,
            Arc::new(self.heating_tx.clone()),
        )
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Environment snapshots, one per successful cycle
    pub fn observe_state(&self) -> PollStream<Arc<EnvironmentState>> {
        PollStream::broadcast(self.state_tx.subscribe())
    }

    /// Alert lists, one per cycle; empty when the fetch failed
    pub fn observe_alerts(&self) -> PollStream<Arc<Vec<Alert>>> {
        PollStream::broadcast(self.alerts_tx.subscribe())
    }

    /// Agent message lists, one per cycle; empty when the fetch failed
    pub fn observe_messages(&self) -> PollStream<Arc<Vec<AgentMessage>>> {
        PollStream::broadcast(self.messages_tx.subscribe())
    }

    /// Heating updates for a single room
    pub fn observe_heating(&self, room_id: RoomId) -> PollStream<RoomHeatingResponse> {
        PollStream::broadcast(self.heating_tx.subscribe())
            .filtered(move |update: &RoomHeatingResponse| update.room_id == room_id)
    }

    /// Heating updates for every tracked room
    pub fn observe_all_heating(&self) -> PollStream<RoomHeatingResponse> {
        PollStream::broadcast(self.heating_tx.subscribe())
    }

    /// All four streams, for binding a view model
    pub fn view_sources(&self) -> ViewSources {
        ViewSources {
            state: self.observe_state(),
            alerts: self.observe_alerts(),
            messages: self.observe_messages(),
            heating: self.observe_all_heating(),
        }
    }

    pub async fn fetch_state(&self) -> Result<EnvironmentState> {
        Ok(self.api.get_environment_state().await?)
    }

    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.api.get_alerts().await?)
    }

    pub async fn fetch_messages(&self) -> Result<Vec<AgentMessage>> {
        Ok(self.api.get_messages().await?)
    }

    pub async fn fetch_room_heating(&self, room_id: &RoomId) -> Result<RoomHeatingResponse> {
        Ok(self.api.get_room_heating(room_id).await?)
    }

    /// Fetch state, alerts and messages once and publish them to observers
    ///
    /// Unlike the pollers, a failure here is returned and nothing is
    /// published.
    pub async fn refresh(&self) -> Result<()> {
        let (state, alerts, messages) = tokio::try_join!(
            self.api.get_environment_state(),
            self.api.get_alerts(),
            self.api.get_messages(),
        )?;

        let _ = self.state_tx.send(Arc::new(state));
        let _ = self.alerts_tx.send(Arc::new(alerts));
        let _ = self.messages_tx.send(Arc::new(messages));
        Ok(())
    }

    /// Rooms that currently have a heating poller
    pub async fn tracked_rooms(&self) -> Vec<RoomId> {
        let heating = self.running.lock().as_ref().map(|r| Arc::clone(&r.heating));
        match heating {
            Some(heating) => {
                let mut rooms = heating.lock().await.keys();
                rooms.sort();
                rooms
            }
            None => Vec::new(),
        }
    }

    /// Statistics for every running poller
    pub async fn stats(&self) -> Vec<PollerStats> {
        let (mut stats, heating) = match self.running.lock().as_ref() {
            Some(running) => (
                running.pollers.iter().map(PollingTask::stats).collect::<Vec<_>>(),
                Some(Arc::clone(&running.heating)),
            ),
            None => (Vec::new(), None),
        };

        if let Some(heating) = heating {
            stats.extend(heating.lock().await.stats().pollers);
        }
        stats
    }

    /// Stop every poller and release the transport
    ///
    /// No request is issued after this returns. Calling it again is a no-op.
    /// A room tracker that failed on supervisor misuse is reported here.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let running = self.running.lock().take();
        let mut outcome = Ok(());

        if let Some(mut running) = running {
            running.room_tracker.abort();
            match (&mut running.room_tracker).await {
                Ok(Err(e)) => outcome = Err(SdkError::Supervisor(e)),
                Ok(Ok(())) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => tracing::warn!(error = %e, "Room tracker ended abnormally"),
            }

            let pollers = std::mem::take(&mut running.pollers);
            for poller in &pollers {
                poller.cancel();
            }
            for poller in pollers {
                if let Err(e) = poller.shutdown().await {
                    tracing::warn!(error = %e, "Poller ended abnormally");
                }
            }

            running.heating.lock().await.shutdown_all().await;
        }

        self.api.close();
        tracing::info!("Sync client shut down");
        outcome
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("base_url", &self.config.base_url)
            .field("running", &self.is_running())
            .field("shut_down", &self.shut_down.load(Ordering::Relaxed))
            .finish()
    }
}

async fn run_room_tracker(
    snapshots: broadcast::Receiver<Arc<EnvironmentState>>,
    heating: Arc<tokio::sync::Mutex<HeatingSupervisor>>,
) -> std::result::Result<(), SupervisorError> {
    let result = track_rooms(snapshots, heating).await;
    report_tracker_exit(&result);
    result
}

fn report_tracker_exit(result: &std::result::Result<(), SupervisorError>) {
    match result {
        Ok(()) => tracing::debug!("Room tracker stopped"),
        Err(e) => tracing::error!(error = %e, "Room tracker failed, room heating is no longer tracked"),
    }
}

/// Keep one heating poller per room of the latest snapshot
async fn track_rooms(
    mut snapshots: broadcast::Receiver<Arc<EnvironmentState>>,
    heating: Arc<tokio::sync::Mutex<HeatingSupervisor>>,
) -> std::result::Result<(), SupervisorError> {
    loop {
        let state = match snapshots.recv().await {
            Ok(state) => state,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Room tracker lagged, catching up");
                continue;
            }
            Err(RecvError::Closed) => return Ok(()),
        };

        let reconciliation = heating.lock().await.reconcile(state.room_ids()).await?;
        for room_id in &reconciliation.started {
            tracing::debug!(room_id = %room_id, "Tracking room heating");
        }
        for room_id in &reconciliation.stopped {
            tracing::debug!(room_id = %room_id, "Room vanished, heating poller stopped");
        }
    }
}
