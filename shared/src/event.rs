//! Live-update events pushed to dashboard sessions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveEventType {
    NewIncident,
    IncidentUpdated,
    IncidentDeleted,
    TicketUpdated,
}

/// `{type, data}` frame sent to every live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    #[serde(rename = "type")]
    pub event_type: LiveEventType,
    pub data: Value,
}

impl LiveEvent {
    /// Build an event from any serializable payload
    pub fn new<T: Serialize>(event_type: LiveEventType, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type,
            data: serde_json::to_value(data)?,
        })
    }
}
