//! Per-room heating status

use serde::{Deserialize, Serialize};

use super::RoomId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHeatingResponse {
    pub room_id: RoomId,
    pub heating_active: bool,
}
