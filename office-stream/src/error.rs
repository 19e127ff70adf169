//! Error types for the office-stream crate.

/// Errors from individual polling tasks.
#[derive(Debug, thiserror::Error)]
pub enum PollingError {
    /// The polling task panicked or could not be joined
    #[error("Polling task {name} failed: {reason}")]
    TaskJoin {
        /// Name of the poller
        name: String,
        /// Reason reported by the runtime
        reason: String,
    },
}

/// Misuse of a [`PollerSupervisor`](crate::PollerSupervisor).
///
/// These indicate a programming error in the caller, not a backend failure,
/// and are always propagated.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// A poller was started for a key that already has one
    #[error("Poller for key {0} is already running")]
    AlreadyTracked(String),

    /// A poller was cancelled for a key that has none
    #[error("No poller is tracked for key {0}")]
    NotTracked(String),
}

/// Convenience type alias for polling results.
pub type PollingResult<T> = std::result::Result<T, PollingError>;
