//! Ticket Model
//!
//! The work item derived 1:1 from an incident and tracked to resolution.

use super::actor::ActorRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status shared by incidents and tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    /// Legacy `verified` is read as in progress
    #[serde(alias = "verified")]
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized status value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid status: {}", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for TicketStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "verified" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(InvalidStatus(s.to_string())),
        }
    }
}

/// Priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only ticket note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketNote {
    pub note: String,
    /// Author id
    pub by: String,
    pub created_at: String,
}

/// Annotation left by a supervisor-authorized reopen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenWarning {
    pub message: String,
    pub issued_by: ActorRef,
    pub issued_at: String,
}

/// Who reopened a resolved ticket, and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReopenedBy {
    pub id: String,
    pub name: String,
    pub at: String,
}

/// Ticket entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    /// Set at creation, never changed
    pub incident_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reported_by: Option<String>,
    pub reporter_id: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub assigned_to: Option<String>,
    /// Digits only
    pub assignee_phone: Option<String>,
    pub assignee_photo: Option<String>,
    pub assignee_user_id: Option<String>,
    pub assignee_email: Option<String>,
    #[serde(default)]
    pub notes: Vec<TicketNote>,
    pub reopen_warning: Option<ReopenWarning>,
    pub reopened_by: Option<ReopenedBy>,
    pub created_at: String,
    pub updated_at: String,
}

/// Status change payload
///
/// `status` stays a string so unknown values surface as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketStatusUpdate {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Assignment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAssign {
    #[serde(alias = "assignedTo")]
    pub name: String,
    #[serde(alias = "assigneePhone")]
    pub phone: String,
    #[serde(default, alias = "assigneePhoto")]
    pub photo: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Listing filters (equality on each present field)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

impl TicketFilter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|s| ticket.status == s)
            && self.priority.is_none_or(|p| ticket.priority == p)
            && self
                .category
                .as_deref()
                .is_none_or(|c| ticket.category == c)
    }
}

/// Ticket counters for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub resolved_today: u64,
    /// Percent of resolved tickets, two decimals
    pub resolution_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_normalizes_verified() {
        assert_eq!("verified".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert_eq!(
            "in_progress".parse::<TicketStatus>(),
            Ok(TicketStatus::InProgress)
        );
        assert_eq!(" Resolved ".parse::<TicketStatus>(), Ok(TicketStatus::Resolved));
        assert_eq!("open".parse::<TicketStatus>(), Ok(TicketStatus::Open));
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("closed".parse::<TicketStatus>().is_err());
        assert!("".parse::<TicketStatus>().is_err());
        assert!("in progress".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_serde_alias() {
        let s: TicketStatus = serde_json::from_str("\"verified\"").unwrap();
        assert_eq!(s, TicketStatus::InProgress);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"in_progress\"");
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_assign_accepts_legacy_field_names() {
        let a: TicketAssign =
            serde_json::from_str(r#"{"assignedTo":"Ravi","assigneePhone":"9876543210"}"#).unwrap();
        assert_eq!(a.name, "Ravi");
        assert_eq!(a.phone, "9876543210");
        assert!(a.photo.is_none());
    }
}
