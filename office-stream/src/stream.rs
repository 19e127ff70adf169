//! Consumer side of a poller

use std::sync::Arc;

use futures::Stream;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};

type Filter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

enum Source<T> {
    Unicast(mpsc::UnboundedReceiver<T>),
    Broadcast(broadcast::Receiver<T>),
}

/// An ordered, possibly infinite sequence of polled values
///
/// Values arrive in emission order. Subscribers to a shared poller that fall
/// too far behind lose the oldest values; this is logged and the stream
/// resumes from the oldest value still buffered.
pub struct PollStream<T> {
    source: Source<T>,
    filter: Option<Filter<T>>,
}

impl<T: Clone + Send + 'static> PollStream<T> {
    /// Stream over the single consumer of a dedicated poller
    pub fn unicast(receiver: mpsc::UnboundedReceiver<T>) -> Self {
        Self {
            source: Source::Unicast(receiver),
            filter: None,
        }
    }

    /// Stream over one subscription to a shared poller
    pub fn broadcast(receiver: broadcast::Receiver<T>) -> Self {
        Self {
            source: Source::Broadcast(receiver),
            filter: None,
        }
    }

    /// Only yield values matching `predicate`
    pub fn filtered(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Wait for the next value; `None` once the poller has stopped
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            let value = match &mut self.source {
                Source::Unicast(receiver) => receiver.recv().await?,
                Source::Broadcast(receiver) => match receiver.recv().await {
                    Ok(value) => value,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber lagged behind poller output");
                        continue;
                    }
                    Err(RecvError::Closed) => return None,
                },
            };

            if self.accepts(&value) {
                return Some(value);
            }
        }
    }

    /// Take the next buffered value without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            let value = match &mut self.source {
                Source::Unicast(receiver) => receiver.try_recv().ok()?,
                Source::Broadcast(receiver) => match receiver.try_recv() {
                    Ok(value) => value,
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber lagged behind poller output");
                        continue;
                    }
                    Err(_) => return None,
                },
            };

            if self.accepts(&value) {
                return Some(value);
            }
        }
    }

    fn accepts(&self, value: &T) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(value))
    }

    /// Adapt into a [`futures::Stream`]
    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        futures::stream::unfold(self, |mut stream| async move {
            let value = stream.recv().await?;
            Some((value, stream))
        })
    }
}

impl<T> std::fmt::Debug for PollStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            Source::Unicast(_) => "unicast",
            Source::Broadcast(_) => "broadcast",
        };
        f.debug_struct("PollStream")
            .field("source", &kind)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
