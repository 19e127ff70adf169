//! Environment snapshot and rooms

use serde::{Deserialize, Serialize};

use super::{BlindsDevice, LightDevice, MotionSensor, PrinterDevice, RoomId, TemperatureSensor};

/// Placeholder title for meetings the backend sends without one
pub const DEFAULT_MEETING_TITLE: &str = "Meeting";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_meeting_title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub lights: Vec<LightDevice>,
    #[serde(default)]
    pub printer: Option<PrinterDevice>,
    pub motion_sensor: MotionSensor,
    pub temperature_sensor: TemperatureSensor,
    #[serde(default)]
    pub blinds: Option<BlindsDevice>,
    #[serde(default)]
    pub people_count: u32,
    #[serde(default)]
    pub scheduled_meetings: Vec<Meeting>,
    /// Lux
    #[serde(default)]
    pub illumination: f64,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.people_count > 0
    }
}

/// Full environment snapshot produced by the simulation backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentState {
    pub simulation_time: String,
    pub rooms: Vec<Room>,
    /// Degrees Celsius
    pub external_temperature: f64,
    #[serde(default = "default_multiplier")]
    pub time_speed_multiplier: f64,
    #[serde(default)]
    pub power_outage: bool,
    /// External light level
    #[serde(default = "default_multiplier")]
    pub daylight_intensity: f64,
}

impl EnvironmentState {
    /// Look up a room by id
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.id == id)
    }

    /// Room ids in snapshot order
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|room| room.id.clone()).collect()
    }

    /// Daylight intensity as a whole percentage, truncated
    pub fn daylight_percent(&self) -> i64 {
        (self.daylight_intensity * 100.0) as i64
    }
}

/// Truncate a reading to one decimal place, the way temperatures are displayed
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).trunc() / 10.0
}

fn default_meeting_title() -> String {
    DEFAULT_MEETING_TITLE.to_string()
}

fn default_multiplier() -> f64 {
    1.0
}
