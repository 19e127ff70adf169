//! REST endpoints consumed by the client

use url::Url;

use crate::error::{ApiError, Result};
use crate::model::RoomId;

/// One backend resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/environment/state`
    EnvironmentState,
    /// `GET /api/environment/alerts`
    Alerts,
    /// `GET /api/environment/agents/messages`
    AgentMessages,
    /// `GET /api/environment/rooms/{roomId}/heating`
    RoomHeating(RoomId),
}

impl Endpoint {
    /// Short name used in logs and decode errors
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::EnvironmentState => "state",
            Endpoint::Alerts => "alerts",
            Endpoint::AgentMessages => "messages",
            Endpoint::RoomHeating(_) => "heating",
        }
    }

    fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::EnvironmentState => vec!["api", "environment", "state"],
            Endpoint::Alerts => vec!["api", "environment", "alerts"],
            Endpoint::AgentMessages => vec!["api", "environment", "agents", "messages"],
            Endpoint::RoomHeating(room_id) => {
                vec!["api", "environment", "rooms", room_id.as_str(), "heating"]
            }
        }
    }

    /// Resolve this endpoint against a base URL
    ///
    /// Path segments are appended to whatever path the base already has, and
    /// room ids are percent-encoded as a single segment.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", base)))?;
            path.pop_if_empty();
            path.extend(self.segments());
        }
        Ok(url)
    }
}
