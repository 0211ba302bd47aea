//! Lifecycle services
//!
//! Each service owns its repositories and side-effect handles. Handlers
//! call into these and never touch the store directly.

pub mod analytics;
pub mod incidents;
pub mod password_reset;
pub mod recipients;
pub mod tickets;

pub use analytics::AnalyticsService;
pub use incidents::IncidentService;
pub use password_reset::PasswordResetService;
pub use tickets::TicketService;

use serde::Serialize;
use shared::models::{Actor, TicketStatus};
use shared::util::is_valid_id;
use shared::{AppError, AppResult, ErrorCode, LiveEvent, LiveEventType};

use crate::live::LiveHub;

/// Reject malformed document ids before they reach the store
pub(crate) fn check_id(id: &str, what: &str) -> AppResult<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(AppError::invalid_format(format!("Invalid {what} id")).with_detail("id", id))
    }
}

/// Wire status string, `verified` accepted as `in_progress`
pub(crate) fn parse_status(raw: &str) -> AppResult<TicketStatus> {
    raw.parse::<TicketStatus>().map_err(|e| {
        AppError::with_message(ErrorCode::InvalidStatus, format!("Invalid status: {}", e.0))
            .with_detail("allowed", "open, in_progress, resolved")
    })
}

pub(crate) fn require_official(actor: &Actor) -> AppResult<()> {
    if actor.is_official() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::OfficialRequired))
    }
}

/// Best-effort live announcement
pub(crate) fn announce<T: Serialize>(hub: &LiveHub, event_type: LiveEventType, payload: &T) {
    match LiveEvent::new(event_type, payload) {
        Ok(event) => {
            hub.broadcast(&event);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to build live event"),
    }
}
