//! Failure policies
//!
//! A failure policy turns the outcome of one fetch into what the poller does
//! with it. Keeping this a plain function of `Result<T, E>` makes each
//! resource's error contract testable without running a poller.

use std::fmt::Display;

/// What a poller does when a fetch fails
#[derive(Debug, Clone, PartialEq)]
pub enum FailurePolicy<T> {
    /// Emit nothing this cycle and log the failure as a warning
    SkipAndLog,
    /// Emit the given value in place of the failed fetch
    Fallback(T),
    /// Emit nothing so consumers keep whatever value they already hold
    KeepPrevious,
}

/// Outcome of applying a policy to one fetch result
#[derive(Debug, Clone, PartialEq)]
pub enum PollAction<T> {
    /// The fetch succeeded
    Emit(T),
    /// The fetch failed and the policy supplied a value
    EmitFallback(T),
    /// Nothing is emitted this cycle
    Skip,
}

impl<T> PollAction<T> {
    /// The value to emit, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            PollAction::Emit(value) | PollAction::EmitFallback(value) => Some(value),
            PollAction::Skip => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, PollAction::Emit(_))
    }
}

impl<T: Clone> FailurePolicy<T> {
    /// Decide what to emit for one fetch outcome
    pub fn apply<E>(&self, result: Result<T, E>) -> PollAction<T> {
        match result {
            Ok(value) => PollAction::Emit(value),
            Err(_) => match self {
                FailurePolicy::SkipAndLog | FailurePolicy::KeepPrevious => PollAction::Skip,
                FailurePolicy::Fallback(value) => PollAction::EmitFallback(value.clone()),
            },
        }
    }
}

impl<T> FailurePolicy<T> {
    /// Carry the policy over to a different output type
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FailurePolicy<U> {
        match self {
            FailurePolicy::SkipAndLog => FailurePolicy::SkipAndLog,
            FailurePolicy::Fallback(value) => FailurePolicy::Fallback(f(value)),
            FailurePolicy::KeepPrevious => FailurePolicy::KeepPrevious,
        }
    }

    /// Log a fetch failure at the level this policy calls for
    pub(crate) fn log_failure(&self, poller: &str, error: &dyn Display) {
        match self {
            FailurePolicy::SkipAndLog => {
                tracing::warn!(poller, error = %error, "Fetch failed, skipping cycle");
            }
            FailurePolicy::Fallback(_) => {
                tracing::warn!(poller, error = %error, "Fetch failed, emitting fallback");
            }
            FailurePolicy::KeepPrevious => {
                tracing::debug!(poller, error = %error, "Fetch failed, keeping previous value");
            }
        }
    }
}

impl<T> Default for FailurePolicy<T> {
    fn default() -> Self {
        FailurePolicy::SkipAndLog
    }
}
