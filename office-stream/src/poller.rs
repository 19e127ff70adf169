//! Fixed-interval resource polling
//!
//! A [`PollingTask`] repeatedly runs one fetch, applies its
//! [`FailurePolicy`] to the outcome and hands the result to a [`PollSink`].
//! The interval is measured from the end of one fetch to the start of the
//! next, so cycles never overlap and a slow backend only stretches the
//! period.

use std::fmt::{self, Display};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{PollingError, PollingResult};
use crate::policy::{FailurePolicy, PollAction};
use crate::sink::PollSink;
use crate::stream::PollStream;

/// Shared counters updated by the polling loop
#[derive(Debug, Default)]
struct PollCounters {
    cycles: AtomicU64,
    emissions: AtomicU64,
    fallbacks: AtomicU64,
    skips: AtomicU64,
    consecutive_failures: AtomicU32,
}

/// A single background polling loop
#[derive(Debug)]
pub struct PollingTask {
    /// Name used in logs and statistics
    name: String,

    /// Delay between the end of one fetch and the start of the next
    interval: Duration,

    /// Task handle for the background polling loop
    task_handle: JoinHandle<()>,

    /// Set once the task is cancelled; checked before every fetch and delivery
    shutdown_signal: Arc<AtomicBool>,

    /// When this task was started
    started_at: SystemTime,

    counters: Arc<PollCounters>,
}

impl PollingTask {
    /// Spawn a polling loop that feeds `sink`
    ///
    /// The first fetch runs immediately. The loop ends when the task is
    /// cancelled or the sink reports that its consumer is gone.
    pub fn start<T, E, F, Fut, S>(
        name: impl Into<String>,
        fetch: F,
        interval: Duration,
        policy: FailurePolicy<T>,
        sink: S,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        S: PollSink<T>,
    {
        let name = name.into();
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(PollCounters::default());

        let task_name = name.clone();
        let task_shutdown_signal = Arc::clone(&shutdown_signal);
        let task_counters = Arc::clone(&counters);

        let task_handle = tokio::spawn(async move {
            Self::polling_loop(
                task_name,
                fetch,
                interval,
                policy,
                sink,
                task_shutdown_signal,
                task_counters,
            )
            .await;
        });

        Self {
            name,
            interval,
            task_handle,
            shutdown_signal,
            started_at: SystemTime::now(),
            counters,
        }
    }

    async fn polling_loop<T, E, F, Fut, S>(
        name: String,
        mut fetch: F,
        interval: Duration,
        policy: FailurePolicy<T>,
        sink: S,
        shutdown_signal: Arc<AtomicBool>,
        counters: Arc<PollCounters>,
    ) where
        T: Clone + Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        S: PollSink<T>,
    {
        tracing::debug!(poller = %name, ?interval, "Starting polling task");

        loop {
            if shutdown_signal.load(Ordering::Acquire) {
                break;
            }

            counters.cycles.fetch_add(1, Ordering::Relaxed);
            let result = fetch().await;

            // A fetch that completes after cancellation is discarded.
            if shutdown_signal.load(Ordering::Acquire) {
                break;
            }

            if let Err(error) = &result {
                policy.log_failure(&name, error);
            }

            let action = policy.apply(result);
            if action.is_failure() {
                counters.consecutive_failures.fetch_add(1, Ordering::Relaxed);
            } else {
                counters.consecutive_failures.store(0, Ordering::Relaxed);
            }

            let value = match action {
                PollAction::Emit(value) => Some(value),
                PollAction::EmitFallback(value) => {
                    counters.fallbacks.fetch_add(1, Ordering::Relaxed);
                    Some(value)
                }
                PollAction::Skip => {
                    counters.skips.fetch_add(1, Ordering::Relaxed);
                    None
                }
            };

            if let Some(value) = value {
                if !sink.deliver(value) {
                    tracing::debug!(poller = %name, "Consumer dropped, stopping polling task");
                    break;
                }
                counters.emissions.fetch_add(1, Ordering::Relaxed);
            }

            tokio::time::sleep(interval).await;
        }

        tracing::debug!(poller = %name, "Polling task stopped");
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the loop is still running
    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }

    /// Signal the loop to stop without waiting for it
    ///
    /// No value is delivered after this returns, even if a fetch is in
    /// flight.
    pub fn cancel(&self) {
        self.shutdown_signal.store(true, Ordering::Release);
        self.task_handle.abort();
    }

    /// Cancel the loop and wait for it to finish
    pub async fn shutdown(mut self) -> PollingResult<()> {
        self.cancel();

        match (&mut self.task_handle).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(PollingError::TaskJoin {
                name: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Snapshot of this task's counters
    pub fn stats(&self) -> PollerStats {
        PollerStats {
            name: self.name.clone(),
            interval: self.interval,
            started_at: self.started_at,
            cycles: self.counters.cycles.load(Ordering::Relaxed),
            emissions: self.counters.emissions.load(Ordering::Relaxed),
            fallbacks: self.counters.fallbacks.load(Ordering::Relaxed),
            skips: self.counters.skips.load(Ordering::Relaxed),
            consecutive_failures: self.counters.consecutive_failures.load(Ordering::Relaxed),
            is_running: self.is_running(),
        }
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.shutdown_signal.store(true, Ordering::Release);
        self.task_handle.abort();
    }
}

/// Start a poller with its own unbounded output stream
///
/// Dropping the returned [`PollStream`] stops the poller at its next
/// delivery; dropping or shutting down the [`PollingTask`] stops it
/// immediately.
pub fn observe<T, E, F, Fut>(
    name: impl Into<String>,
    fetch: F,
    interval: Duration,
    policy: FailurePolicy<T>,
) -> (PollingTask, PollStream<T>)
where
    T: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let (sender, receiver) = mpsc::unbounded_channel();
    let task = PollingTask::start(name, fetch, interval, policy, sender);
    (task, PollStream::unicast(receiver))
}

/// Statistics for one polling task
#[derive(Debug, Clone)]
pub struct PollerStats {
    pub name: String,
    pub interval: Duration,
    pub started_at: SystemTime,
    /// Fetches started
    pub cycles: u64,
    /// Values delivered, fallbacks included
    pub emissions: u64,
    pub fallbacks: u64,
    pub skips: u64,
    pub consecutive_failures: u32,
    pub is_running: bool,
}

impl Display for PollerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} every {:?}: {} cycles, {} emitted ({} fallback), {} skipped, {} consecutive failures{}",
            self.name,
            self.interval,
            self.cycles,
            self.emissions,
            self.fallbacks,
            self.skips,
            self.consecutive_failures,
            if self.is_running { "" } else { " [stopped]" }
        )
    }
}
