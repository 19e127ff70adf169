//! Alerts raised by the simulation

use serde::{Deserialize, Serialize};

use super::RoomId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    /// Free-form tag such as `low_toner`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub printer_id: Option<String>,
    #[serde(default)]
    pub light_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub room_name: Option<String>,
    pub message: String,
    pub timestamp: String,
    #[serde(default)]
    pub severity: Severity,
}
