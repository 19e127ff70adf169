//! Room identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a room
///
/// Room ids are stable across polling cycles, which makes them the join key
/// between the environment snapshot and the per-room heating pollers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        RoomId::new(s)
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        RoomId::new(s)
    }
}
