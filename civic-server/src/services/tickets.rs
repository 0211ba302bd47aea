//! Ticket Lifecycle Manager
//!
//! State machine over open / in_progress / resolved:
//!
//! ```text
//!            ┌──────────────┐
//!   open ───▶│ in_progress  │───▶ resolved
//!    ▲  ╲    └──────────────┘       │
//!    │   ╲─────────────────────────▶│
//!    └──── head supervisor only ◀───┘
//! ```
//!
//! Writes are per-document atomic with last-write-wins between concurrent
//! callers. The reopen check reads the status before the write, so a
//! concurrent reopen and forward update on the same ticket can interleave.

use std::sync::Arc;

use shared::models::{
    Actor, ActorRef, ReopenWarning, ReopenedBy, Ticket, TicketAssign, TicketFilter, TicketNote,
    TicketStats, TicketStatus, TicketStatusUpdate,
};
use shared::util::now_iso;
use shared::{AppError, AppResult, ErrorCode, LiveEventType};

use super::recipients::resolve_and_repair;
use super::{announce, check_id, parse_status, require_official};
use crate::db::Store;
use crate::db::repository::{IncidentRepository, TicketRepository, UserDirectory};
use crate::live::LiveHub;
use crate::notify::{NotifyOutcome, Notifier, templates};
use crate::utils::phone::digits_only;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_PHONE_DIGITS, MAX_URL_LEN, MIN_PHONE_DIGITS,
    validate_optional_text, validate_required_text,
};

/// Outcomes of one notification round, per leg
#[derive(Debug, Default)]
pub struct NotifyReport {
    pub sms: Option<NotifyOutcome>,
    pub whatsapp: Option<NotifyOutcome>,
    pub email: Option<NotifyOutcome>,
}

#[derive(Clone)]
pub struct TicketService {
    tickets: TicketRepository,
    incidents: IncidentRepository,
    users: Arc<dyn UserDirectory>,
    hub: LiveHub,
    notifier: Notifier,
}

fn note(text: Option<&str>, actor: &Actor, at: &str) -> Option<TicketNote> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(|t| TicketNote {
        note: t.to_string(),
        by: actor.id.clone(),
        created_at: at.to_string(),
    })
}

fn invalid_assignee(message: impl Into<String>, field: &str) -> AppError {
    AppError::with_message(ErrorCode::InvalidAssignee, message).with_detail("field", field)
}

impl TicketService {
    pub fn new(store: &Store, users: Arc<dyn UserDirectory>, hub: LiveHub, notifier: Notifier) -> Self {
        Self {
            tickets: TicketRepository::new(store),
            incidents: IncidentRepository::new(store),
            users,
            hub,
            notifier,
        }
    }

    fn load(&self, id: &str) -> AppResult<Ticket> {
        check_id(id, "ticket")?;
        self.tickets
            .find_by_id(id)?
            .ok_or_else(|| AppError::new(ErrorCode::TicketNotFound).with_detail("id", id))
    }

    pub fn list(&self, filter: &TicketFilter, actor: &Actor) -> AppResult<Vec<Ticket>> {
        require_official(actor)?;
        Ok(self.tickets.list(filter)?)
    }

    pub fn get(&self, id: &str, actor: &Actor) -> AppResult<Ticket> {
        require_official(actor)?;
        self.load(id)
    }

    pub fn stats(&self, actor: &Actor) -> AppResult<TicketStats> {
        require_official(actor)?;
        let all = self.tickets.all()?;
        let since = (chrono::Utc::now() - chrono::Duration::days(1))
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let count = |s: TicketStatus| all.iter().filter(|t| t.status == s).count() as u64;
        let total = all.len() as u64;
        let resolved = count(TicketStatus::Resolved);
        let resolved_today = all
            .iter()
            .filter(|t| t.status == TicketStatus::Resolved && t.updated_at >= since)
            .count() as u64;
        let resolution_rate = if total > 0 {
            (resolved as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(TicketStats {
            total_tickets: total,
            open_tickets: count(TicketStatus::Open),
            in_progress: count(TicketStatus::InProgress),
            resolved,
            resolved_today,
            resolution_rate,
        })
    }

    /// Move a ticket through the state machine
    ///
    /// `resolved -> open` needs a head supervisor. An authorized reopen
    /// stamps `reopenedBy`, overwrites `reopenWarning` and sends the reopen
    /// notice; any other transition clears a pending warning.
    pub async fn update_status(
        &self,
        id: &str,
        payload: TicketStatusUpdate,
        actor: &Actor,
    ) -> AppResult<Ticket> {
        require_official(actor)?;
        check_id(id, "ticket")?;
        let status = parse_status(&payload.status)?;
        validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

        let current = self.load(id)?;
        let is_reopen = current.status == TicketStatus::Resolved && status == TicketStatus::Open;
        if is_reopen && !actor.is_head_supervisor() {
            tracing::warn!(ticket_id = %id, actor = %actor.id, "Reopen refused, head supervisor required");
            return Err(AppError::new(ErrorCode::ReopenNotAllowed));
        }

        let now = now_iso();
        let new_note = note(payload.notes.as_deref(), actor, &now);
        let stamp = now.clone();
        let ticket = self
            .tickets
            .update(id, |t| {
                t.status = status;
                t.updated_at = stamp.clone();
                t.notes.extend(new_note);
                if is_reopen {
                    t.reopened_by = Some(ReopenedBy {
                        id: actor.id.clone(),
                        name: actor.name.clone(),
                        at: stamp.clone(),
                    });
                    t.reopen_warning = Some(ReopenWarning {
                        message: format!(
                            "Reopened by {} after resolution. Review and resume work.",
                            actor.name
                        ),
                        issued_by: ActorRef::from(actor),
                        issued_at: stamp,
                    });
                } else {
                    t.reopen_warning = None;
                }
            })?
            .ok_or_else(|| AppError::new(ErrorCode::TicketNotFound).with_detail("id", id))?;

        self.incidents.update(&ticket.incident_id, |i| {
            i.status = ticket.status;
            i.updated_at = now;
        })?;

        tracing::info!(
            ticket_id = %ticket.id,
            from = %current.status,
            to = %ticket.status,
            by = %actor.id,
            reopen = is_reopen,
            "Ticket status updated"
        );

        if is_reopen {
            self.notify_reopen(&ticket, actor).await;
        }
        let mut ticket = ticket;
        self.notify_update(&mut ticket).await;
        announce(&self.hub, LiveEventType::TicketUpdated, &ticket);
        Ok(ticket)
    }

    /// Assign a ticket to a field worker
    pub async fn assign(&self, id: &str, payload: TicketAssign, actor: &Actor) -> AppResult<Ticket> {
        require_official(actor)?;
        check_id(id, "ticket")?;

        let name = payload.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid_assignee("Assignee name is required", "name"));
        }
        validate_required_text(&name, "name", MAX_NAME_LEN)?;

        let phone = digits_only(&payload.phone);
        if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&phone.len()) {
            return Err(invalid_assignee(
                format!("Assignee phone must have {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"),
                "phone",
            )
            .with_detail("digits", phone.len()));
        }
        validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

        let current = self.load(id)?;
        let photo = match payload.photo.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => {
                validate_required_text(p, "photo", MAX_URL_LEN)?;
                p.to_string()
            }
            _ => current
                .assignee_photo
                .clone()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| invalid_assignee("Assignee photo is required", "photo"))?,
        };

        let official = self.users.find_official_by_phone(&phone)?;

        let now = now_iso();
        let new_note = note(payload.notes.as_deref(), actor, &now);
        let stamp = now.clone();
        let ticket = self
            .tickets
            .update(id, |t| {
                t.assigned_to = Some(name.clone());
                t.assignee_phone = Some(phone.clone());
                t.assignee_photo = Some(photo.clone());
                t.assignee_user_id = official.as_ref().map(|u| u.id.clone());
                t.assignee_email = official.as_ref().and_then(|u| u.email.clone());
                t.notes.extend(new_note);
                t.updated_at = stamp;
            })?
            .ok_or_else(|| AppError::new(ErrorCode::TicketNotFound).with_detail("id", id))?;

        self.incidents.update(&ticket.incident_id, |i| {
            i.assigned_to = Some(name);
            i.assignee_phone = Some(phone);
            i.assignee_photo = Some(photo);
            i.updated_at = now;
        })?;

        tracing::info!(
            ticket_id = %ticket.id,
            by = %actor.id,
            matched_official = ticket.assignee_user_id.is_some(),
            "Ticket assigned"
        );

        let mut ticket = ticket;
        self.notify_update(&mut ticket).await;
        announce(&self.hub, LiveEventType::TicketUpdated, &ticket);
        Ok(ticket)
    }

    /// Standard update notice to the reporter
    ///
    /// Text legs go to the reporter phone; the email leg needs a
    /// resolvable reporter email and is skipped without one.
    pub async fn notify_update(&self, ticket: &mut Ticket) -> NotifyReport {
        let mut report = NotifyReport::default();

        if let Some(phone) = ticket.reporter_phone.clone().filter(|p| !p.trim().is_empty()) {
            let text = templates::ticket_update_text(ticket);
            let [sms, whatsapp] = self.notifier.text_both("ticket_update", &phone, &text).await;
            report.sms = Some(sms);
            report.whatsapp = Some(whatsapp);
        }

        let resolved = resolve_and_repair(ticket, &self.incidents, &self.tickets, self.users.as_ref())
            .unwrap_or_else(|e| {
                tracing::warn!(ticket_id = %ticket.id, error = %e, "Reporter email lookup failed");
                None
            });
        report.email = Some(match resolved {
            Some(email) => {
                self.notifier
                    .email("ticket_update", templates::ticket_update_email(&email, ticket))
                    .await
            }
            None => {
                tracing::info!(
                    ticket_id = %ticket.id,
                    status = %ticket.status,
                    "No reporter email resolved, email notice skipped"
                );
                NotifyOutcome::Skipped("no reporter email".into())
            }
        });
        report
    }

    /// Reopen notice to the previous assignee, phone and email
    pub async fn notify_reopen(&self, ticket: &Ticket, actor: &Actor) -> NotifyReport {
        let mut report = NotifyReport::default();
        let by = actor.display_name().unwrap_or_else(|| actor.id.clone());

        let Some(phone) = ticket.assignee_phone.clone().filter(|p| !p.is_empty()) else {
            tracing::info!(ticket_id = %ticket.id, "Reopened ticket has no assignee to notify");
            return report;
        };

        let text = templates::ticket_reopened_text(ticket, &by);
        let [sms, whatsapp] = self.notifier.text_both("ticket_reopen", &phone, &text).await;
        report.sms = Some(sms);
        report.whatsapp = Some(whatsapp);

        let email = match ticket.assignee_email.clone() {
            Some(e) => Some(e),
            None => self
                .users
                .find_official_by_phone(&phone)
                .unwrap_or_else(|e| {
                    tracing::warn!(ticket_id = %ticket.id, error = %e, "Assignee lookup failed");
                    None
                })
                .and_then(|u| u.email),
        };
        if let Some(email) = email {
            report.email = Some(
                self.notifier
                    .email(
                        "ticket_reopen",
                        templates::ticket_reopened_email(&email, ticket, &by),
                    )
                    .await,
            );
        }
        report
    }
}
