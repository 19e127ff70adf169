//! Latest-value view model
//!
//! The [`ViewModel`] holds the most recent value of each polled resource in
//! its own `tokio::sync::watch` slot:
//!
//! ```text
//! ViewModel
//! ├── state:    watch::Sender<Option<Arc<EnvironmentState>>>
//! ├── alerts:   watch::Sender<Option<Arc<Vec<Alert>>>>
//! ├── messages: watch::Sender<Option<Arc<Vec<AgentMessage>>>>
//! ├── heating:  watch::Sender<Arc<HashMap<RoomId, bool>>>
//! └── changes:  broadcast::Sender<ViewChange>
//! ```
//!
//! Each slot is written by exactly one binding task and replaced whole, so a
//! reader holds the slot lock only long enough to clone an `Arc`. A new
//! state drops the heating flags of rooms it no longer contains.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;

use office_api::{AgentMessage, Alert, EnvironmentState, RoomHeatingResponse, RoomId};
use office_stream::PollStream;

use crate::snapshot::OfficeSnapshot;

/// Default capacity of the change feed
pub const DEFAULT_CHANGE_BUFFER: usize = 1000;

/// Which slot changed
///
/// Emitted on the feed returned by [`ViewModel::subscribe_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewChange {
    StateUpdated,
    AlertsUpdated,
    MessagesUpdated,
    HeatingUpdated {
        room_id: RoomId,
        heating_active: bool,
    },
}

/// The four sources a view model binds to
pub struct ViewSources {
    pub state: PollStream<Arc<EnvironmentState>>,
    pub alerts: PollStream<Arc<Vec<Alert>>>,
    pub messages: PollStream<Arc<Vec<AgentMessage>>>,
    pub heating: PollStream<RoomHeatingResponse>,
}

struct Slots {
    state: watch::Sender<Option<Arc<EnvironmentState>>>,
    alerts: watch::Sender<Option<Arc<Vec<Alert>>>>,
    messages: watch::Sender<Option<Arc<Vec<AgentMessage>>>>,
    heating: watch::Sender<Arc<HashMap<RoomId, bool>>>,
    changes_tx: broadcast::Sender<ViewChange>,
}

impl Slots {
    fn new(change_buffer: usize) -> Self {
        let (changes_tx, _) = broadcast::channel(change_buffer.max(1));

        Self {
            state: watch::channel(None).0,
            alerts: watch::channel(None).0,
            messages: watch::channel(None).0,
            heating: watch::channel(Arc::new(HashMap::new())).0,
            changes_tx,
        }
    }

    fn notify(&self, change: ViewChange) {
        // No subscribers is fine
        let _ = self.changes_tx.send(change);
    }

    /// Replace an optional slot, returns true if the value changed
    fn replace<T: PartialEq>(slot: &watch::Sender<Option<Arc<T>>>, value: Arc<T>) -> bool {
        let unchanged = slot.borrow().as_deref() == Some(&*value);
        if unchanged {
            return false;
        }
        slot.send_replace(Some(value));
        true
    }

    fn set_state(&self, state: Arc<EnvironmentState>) {
        let rooms: HashSet<RoomId> = state.room_ids().into_iter().collect();
        if Self::replace(&self.state, state) {
            self.prune_heating(&rooms);
            self.notify(ViewChange::StateUpdated);
        }
    }

    /// Drop heating flags of rooms missing from the latest state
    fn prune_heating(&self, rooms: &HashSet<RoomId>) {
        let stale = self.heating.borrow().keys().any(|id| !rooms.contains(id));
        if !stale {
            return;
        }

        let mut next = (**self.heating.borrow()).clone();
        next.retain(|id, _| rooms.contains(id));
        tracing::trace!(kept = next.len(), "Pruned heating of vanished rooms");
        self.heating.send_replace(Arc::new(next));
    }

    fn set_alerts(&self, alerts: Arc<Vec<Alert>>) {
        if Self::replace(&self.alerts, alerts) {
            self.notify(ViewChange::AlertsUpdated);
        }
    }

    fn set_messages(&self, messages: Arc<Vec<AgentMessage>>) {
        if Self::replace(&self.messages, messages) {
            self.notify(ViewChange::MessagesUpdated);
        }
    }

    fn set_heating(&self, update: RoomHeatingResponse) {
        let current = self.heating.borrow().get(&update.room_id).copied();
        if current == Some(update.heating_active) {
            return;
        }

        let mut next = (**self.heating.borrow()).clone();
        next.insert(update.room_id.clone(), update.heating_active);
        self.heating.send_replace(Arc::new(next));

        tracing::trace!(room_id = %update.room_id, active = update.heating_active, "Heating updated");
        self.notify(ViewChange::HeatingUpdated {
            room_id: update.room_id,
            heating_active: update.heating_active,
        });
    }
}

/// Merged latest-value view of every polled resource
pub struct ViewModel {
    slots: Arc<Slots>,
    bindings: Mutex<Vec<AbortHandle>>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::with_change_buffer(DEFAULT_CHANGE_BUFFER)
    }

    pub fn with_change_buffer(change_buffer: usize) -> Self {
        Self {
            slots: Arc::new(Slots::new(change_buffer)),
            bindings: Mutex::new(Vec::new()),
        }
    }

    /// Consume `sources`, one task per slot
    ///
    /// Must be called from within a tokio runtime. Binding again replaces
    /// the previous sources.
    pub fn bind(&self, sources: ViewSources) {
        let ViewSources {
            state,
            alerts,
            messages,
            heating,
        } = sources;

        let handles = vec![
            spawn_binding("state", state, Arc::clone(&self.slots), Slots::set_state),
            spawn_binding("alerts", alerts, Arc::clone(&self.slots), Slots::set_alerts),
            spawn_binding("messages", messages, Arc::clone(&self.slots), Slots::set_messages),
            spawn_binding("heating", heating, Arc::clone(&self.slots), Slots::set_heating),
        ];

        let previous = std::mem::replace(&mut *self.bindings.lock(), handles);
        for handle in previous {
            handle.abort();
        }
    }

    /// Stop consuming sources; slot values are kept
    pub fn unbind(&self) {
        for handle in self.bindings.lock().drain(..) {
            handle.abort();
        }
    }

    /// Whether sources are currently bound
    pub fn is_bound(&self) -> bool {
        !self.bindings.lock().is_empty()
    }

    /// Current value of every slot
    pub fn snapshot(&self) -> OfficeSnapshot {
        OfficeSnapshot {
            state: self.state(),
            alerts: self.alerts(),
            messages: self.messages(),
            heating: self.heating(),
        }
    }

    pub fn state(&self) -> Option<Arc<EnvironmentState>> {
        self.slots.state.borrow().clone()
    }

    pub fn alerts(&self) -> Option<Arc<Vec<Alert>>> {
        self.slots.alerts.borrow().clone()
    }

    pub fn messages(&self) -> Option<Arc<Vec<AgentMessage>>> {
        self.slots.messages.borrow().clone()
    }

    pub fn heating(&self) -> Arc<HashMap<RoomId, bool>> {
        self.slots.heating.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<Option<Arc<EnvironmentState>>> {
        self.slots.state.subscribe()
    }

    pub fn watch_alerts(&self) -> watch::Receiver<Option<Arc<Vec<Alert>>>> {
        self.slots.alerts.subscribe()
    }

    pub fn watch_messages(&self) -> watch::Receiver<Option<Arc<Vec<AgentMessage>>>> {
        self.slots.messages.subscribe()
    }

    pub fn watch_heating(&self) -> watch::Receiver<Arc<HashMap<RoomId, bool>>> {
        self.slots.heating.subscribe()
    }

    /// Feed of every slot change
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ViewChange> {
        self.slots.changes_tx.subscribe()
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl std::fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModel")
            .field("has_state", &self.slots.state.borrow().is_some())
            .field("bindings", &self.bindings.lock().len())
            .finish()
    }
}

fn spawn_binding<T>(
    slot: &'static str,
    mut source: PollStream<T>,
    slots: Arc<Slots>,
    apply: fn(&Slots, T),
) -> AbortHandle
where
    T: Clone + Send + 'static,
{
    let handle = tokio::spawn(async move {
        while let Some(value) = source.recv().await {
            apply(&slots, value);
        }
        tracing::debug!(slot, "View source ended");
    });
    handle.abort_handle()
}
