//! Point-in-time view of every slot

use std::collections::HashMap;
use std::sync::Arc;

use office_api::{round_tenths, AgentMessage, Alert, Comfort, EnvironmentState, Room, RoomId};

/// The latest value of every slot at one instant
///
/// `None` means the slot has not received a value yet, which is distinct
/// from an empty list. Slots are read independently, so the state and the
/// heating map may come from different poll cycles.
#[derive(Debug, Clone, Default)]
pub struct OfficeSnapshot {
    pub state: Option<Arc<EnvironmentState>>,
    pub alerts: Option<Arc<Vec<Alert>>>,
    pub messages: Option<Arc<Vec<AgentMessage>>>,
    pub heating: Arc<HashMap<RoomId, bool>>,
}

impl OfficeSnapshot {
    /// Whether an environment snapshot has arrived
    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    /// Last known heating flag for a room
    pub fn heating_for(&self, room_id: &RoomId) -> Option<bool> {
        self.heating.get(room_id).copied()
    }

    /// Each room of the current state joined with its heating flag
    ///
    /// Heating entries for rooms no longer in the state are ignored.
    pub fn room_views(&self) -> Vec<RoomView<'_>> {
        let Some(state) = &self.state else {
            return Vec::new();
        };

        state
            .rooms
            .iter()
            .map(|room| RoomView {
                room,
                heating_active: self.heating_for(&room.id),
            })
            .collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.as_ref().map_or(0, |alerts| alerts.len())
    }

    pub fn message_count(&self) -> usize {
        self.messages.as_ref().map_or(0, |messages| messages.len())
    }
}

/// One room as the dashboard shows it
#[derive(Debug, Clone, Copy)]
pub struct RoomView<'a> {
    pub room: &'a Room,
    /// `None` until the room's heating poller has reported
    pub heating_active: Option<bool>,
}

impl RoomView<'_> {
    pub fn id(&self) -> &RoomId {
        &self.room.id
    }

    pub fn comfort(&self) -> Comfort {
        self.room.temperature_sensor.comfort()
    }

    /// Temperature truncated to tenths
    pub fn display_temperature(&self) -> f64 {
        round_tenths(self.room.temperature_sensor.temperature)
    }
}
