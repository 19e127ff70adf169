//! Messages exchanged between simulation agents

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Recipient value addressing every agent
pub const BROADCAST_RECIPIENT: &str = "broadcast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Request,
    Inform,
    Query,
    Response,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub context: Option<HashMap<String, String>>,
}

impl AgentMessage {
    pub fn is_broadcast(&self) -> bool {
        self.recipient_id == BROADCAST_RECIPIENT
    }
}
