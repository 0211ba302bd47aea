//! Incident Model

use super::ticket::{Priority, TicketStatus};
use serde::{Deserialize, Serialize};

/// Citizen-reported civic issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<Priority>,
    pub status: TicketStatus,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Ordered image references, first is primary
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub severity: Option<String>,
    pub scope: Option<String>,
    pub source: Option<String>,
    pub device_id: Option<String>,
    /// Reporter snapshot, captured at creation
    pub reported_by: Option<String>,
    pub reporter_id: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    /// Set once when the companion ticket is derived
    pub ticket_id: Option<String>,
    pub assigned_to: Option<String>,
    pub assignee_phone: Option<String>,
    pub assignee_photo: Option<String>,
    #[serde(default)]
    pub has_messages: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Incident {
    /// Primary image reference
    pub fn image_url(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// Create incident payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentCreate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Partial update: only present (non-null) fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Raw wire status, validated against the ticket state machine
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub images: Option<Vec<String>>,
    pub assigned_to: Option<String>,
    pub severity: Option<String>,
    pub scope: Option<String>,
}

impl IncidentUpdate {
    /// True when any field copied verbatim onto the ticket is present
    ///
    /// `status` is excluded, it goes through the ticket transition path.
    pub fn touches_ticket(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.priority.is_some()
            || self.location.is_some()
            || self.latitude.is_some()
            || self.longitude.is_some()
            || self.assigned_to.is_some()
    }
}

/// Detection event submitted by an edge device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<DetectionReport> for IncidentCreate {
    fn from(report: DetectionReport) -> Self {
        Self {
            title: "AI Detected Issue".to_string(),
            location: format!("{}, {}", report.latitude, report.longitude),
            description: report.description,
            category: "ai".to_string(),
            priority: Some(Priority::High),
            latitude: Some(report.latitude),
            longitude: Some(report.longitude),
            images: report.image_url.into_iter().collect(),
            severity: report.severity,
            scope: report.scope,
            source: Some(report.source.unwrap_or_else(|| "edge".to_string())),
            device_id: report.device_id,
        }
    }
}

/// Incident counters, scoped to what the caller can see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    /// Awaiting triage, same as `open`
    pub pending: u64,
}
