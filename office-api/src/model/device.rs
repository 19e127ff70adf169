//! Devices and sensors installed in a room

use serde::{Deserialize, Serialize};

use super::RoomId;

/// Operating state shared by lights and printers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    On,
    Off,
    Broken,
}

impl DeviceState {
    /// Symbolic name as transmitted on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::On => "ON",
            DeviceState::Off => "OFF",
            DeviceState::Broken => "BROKEN",
        }
    }
}

/// Position of a set of blinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlindState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightDevice {
    pub id: String,
    pub room_id: RoomId,
    pub state: DeviceState,
    /// 0-100
    #[serde(default = "full_level")]
    pub brightness: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterDevice {
    pub id: String,
    pub room_id: RoomId,
    pub state: DeviceState,
    /// 0-100
    #[serde(default = "full_level")]
    pub toner_level: u8,
    /// 0-100
    #[serde(default = "full_level")]
    pub paper_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlindsDevice {
    pub id: String,
    pub room_id: RoomId,
    pub state: BlindState,
}

impl BlindsDevice {
    /// Blinds rendered alongside other devices: open shows as ON, closed as OFF
    pub fn as_device_state(&self) -> DeviceState {
        match self.state {
            BlindState::Open => DeviceState::On,
            BlindState::Closed => DeviceState::Off,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSensor {
    pub id: String,
    pub room_id: RoomId,
    pub motion_detected: bool,
    #[serde(default)]
    pub last_motion_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSensor {
    pub id: String,
    pub room_id: RoomId,
    /// Degrees Celsius
    pub temperature: f64,
}

/// Comfort band of a room temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comfort {
    TooCold,
    Comfortable,
    TooWarm,
}

/// Readings below this are flagged as too cold
pub const COMFORT_MIN_CELSIUS: f64 = 18.0;

/// Readings above this are flagged as too warm
pub const COMFORT_MAX_CELSIUS: f64 = 25.0;

impl TemperatureSensor {
    pub fn comfort(&self) -> Comfort {
        if self.temperature < COMFORT_MIN_CELSIUS {
            Comfort::TooCold
        } else if self.temperature > COMFORT_MAX_CELSIUS {
            Comfort::TooWarm
        } else {
            Comfort::Comfortable
        }
    }
}

fn full_level() -> u8 {
    100
}
