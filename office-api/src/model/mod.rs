//! Model types for the smart-office backend
//!
//! Every entity is an immutable value record; a new poll produces a wholly
//! new value rather than mutating a previous one.

mod alert;
mod device;
mod environment;
mod heating;
mod message;
mod room_id;

pub use alert::{Alert, Severity};
pub use device::{
    BlindState, BlindsDevice, Comfort, DeviceState, LightDevice, MotionSensor, PrinterDevice,
    TemperatureSensor, COMFORT_MAX_CELSIUS, COMFORT_MIN_CELSIUS,
};
pub use environment::{round_tenths, EnvironmentState, Meeting, Room, DEFAULT_MEETING_TITLE};
pub use heating::RoomHeatingResponse;
pub use message::{AgentMessage, MessageType, BROADCAST_RECIPIENT};
pub use room_id::RoomId;
