//! Destinations for poller output

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

/// Receives every value a poller emits
///
/// Returning `false` from [`PollSink::deliver`] tells the poller that its
/// consumer is gone, which ends the polling loop.
pub trait PollSink<T>: Send + Sync + 'static {
    fn deliver(&self, value: T) -> bool;
}

/// Single consumer; dropping the receiver cancels the poller.
impl<T: Send + 'static> PollSink<T> for mpsc::UnboundedSender<T> {
    fn deliver(&self, value: T) -> bool {
        self.send(value).is_ok()
    }
}

/// Fan-out to any number of subscribers.
///
/// Having no subscriber at the moment is not a reason to stop: the owner of
/// the sender decides when polling ends.
impl<T: Send + 'static> PollSink<T> for broadcast::Sender<T> {
    fn deliver(&self, value: T) -> bool {
        let _ = self.send(value);
        true
    }
}

impl<T, S> PollSink<T> for Arc<S>
where
    S: PollSink<T> + ?Sized,
{
    fn deliver(&self, value: T) -> bool {
        (**self).deliver(value)
    }
}
