//! Recipient Resolver
//!
//! Finds a deliverable reporter email for a ticket by walking a fixed
//! chain of sources. First well-formed address wins.

use shared::models::{Incident, Ticket};
use shared::util::{is_valid_email, now_iso};

use crate::db::repository::{IncidentRepository, RepoResult, TicketRepository, UserDirectory};

fn accept(candidate: Option<&str>) -> Option<String> {
    candidate
        .map(str::trim)
        .filter(|c| is_valid_email(c))
        .map(str::to_string)
}

/// Walk the fallback chain for `ticket`
///
/// 1. the ticket's stored reporter email
/// 2. the linked incident's reporter email
/// 3. the user record of the reporter id
/// 4. the user record matching the reporter phone
pub fn resolve_reporter_email(
    ticket: &Ticket,
    incidents: &IncidentRepository,
    users: &dyn UserDirectory,
) -> RepoResult<Option<String>> {
    if let Some(email) = accept(ticket.reporter_email.as_deref()) {
        return Ok(Some(email));
    }

    let incident: Option<Incident> = incidents.find_by_id(&ticket.incident_id)?;
    if let Some(email) = incident
        .as_ref()
        .and_then(|i| accept(i.reporter_email.as_deref()))
    {
        return Ok(Some(email));
    }

    let reporter_id = ticket
        .reporter_id
        .as_deref()
        .or_else(|| incident.as_ref().and_then(|i| i.reporter_id.as_deref()));
    if let Some(id) = reporter_id
        && let Some(email) = users
            .find_by_id(id)?
            .and_then(|u| accept(u.email.as_deref()))
    {
        return Ok(Some(email));
    }

    let reporter_phone = ticket
        .reporter_phone
        .as_deref()
        .or_else(|| incident.as_ref().and_then(|i| i.reporter_phone.as_deref()));
    if let Some(phone) = reporter_phone
        && let Some(email) = users
            .find_by_phone(phone)?
            .and_then(|u| accept(u.email.as_deref()))
    {
        return Ok(Some(email));
    }

    Ok(None)
}

/// Resolve, then store the result on a ticket that lacked a valid one
pub fn resolve_and_repair(
    ticket: &mut Ticket,
    incidents: &IncidentRepository,
    tickets: &TicketRepository,
    users: &dyn UserDirectory,
) -> RepoResult<Option<String>> {
    let resolved = resolve_reporter_email(ticket, incidents, users)?;
    let Some(email) = resolved.clone() else {
        return Ok(None);
    };

    let stored_valid = accept(ticket.reporter_email.as_deref()).is_some();
    if !stored_valid && !ticket.id.is_empty() {
        let repaired = email.clone();
        let updated = tickets.update(&ticket.id, |t| {
            t.reporter_email = Some(repaired);
            t.updated_at = now_iso();
        })?;
        if let Some(updated) = updated {
            tracing::debug!(ticket_id = %ticket.id, "Repaired ticket reporter email");
            *ticket = updated;
        }
    }
    Ok(Some(email))
}
