//! Message Model

use serde::{Deserialize, Serialize};

/// Message posted on an incident thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Not enforced by the store; validated by the caller
    pub incident_id: String,
    pub message: String,
    pub sender_id: String,
    pub sender_name: String,
    pub created_at: String,
}

/// Create message payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub message: String,
}
