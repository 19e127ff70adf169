//! Internal polling machinery for office-sdk
//!
//! This crate turns one-shot fetches into continuous, cancellable streams:
//!
//! - [`PollingTask`]: a fixed-interval loop around a single fetch
//! - [`FailurePolicy`]: what a poller emits when a fetch fails
//! - [`PollerSupervisor`]: one poller per key, reconciled against a key set
//! - [`PollStream`]: the consumer side of a poller
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use office_stream::{observe, FailurePolicy};
//!
//! # async fn run() {
//! let (task, mut alerts) = observe(
//!     "alerts",
//!     || async { Ok::<_, String>(vec!["printer jam".to_string()]) },
//!     Duration::from_secs(2),
//!     FailurePolicy::Fallback(Vec::new()),
//! );
//!
//! while let Some(batch) = alerts.recv().await {
//!     println!("{} alerts", batch.len());
//! }
//! task.shutdown().await.ok();
//! # }
//! ```

pub mod error;
pub mod policy;
pub mod poller;
pub mod sink;
pub mod stream;
pub mod supervisor;

pub use error::{PollingError, PollingResult, SupervisorError};
pub use policy::{FailurePolicy, PollAction};
pub use poller::{observe, PollerStats, PollingTask};
pub use sink::PollSink;
pub use stream::PollStream;
pub use supervisor::{KeyedFetch, PollerSupervisor, Reconciliation, SupervisorStats};
