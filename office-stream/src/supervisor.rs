//! Keyed poller supervision
//!
//! A [`PollerSupervisor`] owns at most one [`PollingTask`] per key and
//! reconciles that set against a desired key set. All pollers share one
//! fetch function, interval, failure policy and sink.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::SupervisorError;
use crate::poller::{PollerStats, PollingTask};
use crate::policy::FailurePolicy;
use crate::sink::PollSink;

/// Fetch function shared by every keyed poller
pub type KeyedFetch<K, T, E> = Arc<dyn Fn(&K) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Keys added and removed by one [`PollerSupervisor::reconcile`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<K> {
    pub started: Vec<K>,
    pub stopped: Vec<K>,
}

impl<K> Reconciliation<K> {
    pub fn is_noop(&self) -> bool {
        self.started.is_empty() && self.stopped.is_empty()
    }
}

/// One poller per key, reconciled against a desired key set
pub struct PollerSupervisor<K, T, E> {
    /// Prefix for poller names
    name: String,

    /// Active polling tasks by key
    active_tasks: HashMap<K, PollingTask>,

    fetch: KeyedFetch<K, T, E>,
    interval: Duration,
    policy: FailurePolicy<T>,
    sink: Arc<dyn PollSink<T>>,
}

impl<K, T, E> PollerSupervisor<K, T, E>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        fetch: KeyedFetch<K, T, E>,
        interval: Duration,
        policy: FailurePolicy<T>,
        sink: Arc<dyn PollSink<T>>,
    ) -> Self {
        Self {
            name: name.into(),
            active_tasks: HashMap::new(),
            fetch,
            interval,
            policy,
            sink,
        }
    }

    /// Start polling for `key`
    pub fn start(&mut self, key: K) -> Result<(), SupervisorError> {
        if self.active_tasks.contains_key(&key) {
            return Err(SupervisorError::AlreadyTracked(key.to_string()));
        }

        let fetch = Arc::clone(&self.fetch);
        let task_key = key.clone();
        let task = PollingTask::start(
            format!("{}[{}]", self.name, key),
            move || fetch(&task_key),
            self.interval,
            self.policy.clone(),
            Arc::clone(&self.sink),
        );

        tracing::debug!(supervisor = %self.name, %key, "Started keyed poller");
        self.active_tasks.insert(key, task);
        Ok(())
    }

    /// Stop polling for `key` and wait until its poller has finished
    pub async fn cancel(&mut self, key: &K) -> Result<(), SupervisorError> {
        let task = self
            .active_tasks
            .remove(key)
            .ok_or_else(|| SupervisorError::NotTracked(key.to_string()))?;

        if let Err(e) = task.shutdown().await {
            tracing::warn!(supervisor = %self.name, %key, error = %e, "Poller ended abnormally");
        }
        tracing::debug!(supervisor = %self.name, %key, "Stopped keyed poller");
        Ok(())
    }

    /// Make the tracked key set equal to `desired`
    ///
    /// Pollers for keys that remain are left running. Removed keys are
    /// fully stopped before this returns, so none of them emits again.
    pub async fn reconcile<I>(&mut self, desired: I) -> Result<Reconciliation<K>, SupervisorError>
    where
        I: IntoIterator<Item = K>,
    {
        let desired: HashSet<K> = desired.into_iter().collect();

        let stopped: Vec<K> = self
            .active_tasks
            .keys()
            .filter(|key| !desired.contains(*key))
            .cloned()
            .collect();
        let started: Vec<K> = desired
            .into_iter()
            .filter(|key| !self.active_tasks.contains_key(key))
            .collect();

        // Signal every removed poller first so they stop together.
        let removed: Vec<(K, PollingTask)> = stopped
            .iter()
            .filter_map(|key| self.active_tasks.remove_entry(key))
            .collect();
        for (_, task) in &removed {
            task.cancel();
        }
        for (key, task) in removed {
            if let Err(e) = task.shutdown().await {
                tracing::warn!(supervisor = %self.name, %key, error = %e, "Poller ended abnormally");
            }
        }

        for key in &started {
            self.start(key.clone())?;
        }

        if !started.is_empty() || !stopped.is_empty() {
            tracing::info!(
                supervisor = %self.name,
                started = started.len(),
                stopped = stopped.len(),
                tracked = self.active_tasks.len(),
                "Reconciled keyed pollers"
            );
        }

        Ok(Reconciliation { started, stopped })
    }

    /// Stop every poller
    pub async fn shutdown_all(&mut self) {
        let tasks: Vec<(K, PollingTask)> = self.active_tasks.drain().collect();
        for (_, task) in &tasks {
            task.cancel();
        }
        for (key, task) in tasks {
            if let Err(e) = task.shutdown().await {
                tracing::warn!(supervisor = %self.name, %key, error = %e, "Poller ended abnormally");
            }
        }
    }

    pub fn is_tracking(&self, key: &K) -> bool {
        self.active_tasks.contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.active_tasks.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.active_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_tasks.is_empty()
    }

    pub fn stats_for(&self, key: &K) -> Option<PollerStats> {
        self.active_tasks.get(key).map(PollingTask::stats)
    }

    pub fn stats(&self) -> SupervisorStats {
        SupervisorStats {
            name: self.name.clone(),
            pollers: self.active_tasks.values().map(PollingTask::stats).collect(),
        }
    }
}

impl<K, T, E> fmt::Debug for PollerSupervisor<K, T, E>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerSupervisor")
            .field("name", &self.name)
            .field("keys", &self.active_tasks.keys().collect::<Vec<_>>())
            .field("interval", &self.interval)
            .finish()
    }
}

/// Statistics for every poller a supervisor tracks
#[derive(Debug, Clone)]
pub struct SupervisorStats {
    pub name: String,
    pub pollers: Vec<PollerStats>,
}

impl SupervisorStats {
    pub fn total_emissions(&self) -> u64 {
        self.pollers.iter().map(|p| p.emissions).sum()
    }
}

impl Display for SupervisorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} pollers", self.name, self.pollers.len())?;
        for poller in &self.pollers {
            writeln!(f, "  {poller}")?;
        }
        Ok(())
    }
}
