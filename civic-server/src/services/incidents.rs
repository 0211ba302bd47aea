//! Incident Lifecycle Manager
//!
//! Creating an incident always derives exactly one ticket. Broadcast and
//! stakeholder alerts follow the write and can never undo it.

use shared::models::{
    Actor, DetectionReport, Incident, IncidentCreate, IncidentStats, IncidentUpdate, Message,
    MessageCreate, Ticket, TicketStatus, TicketStatusUpdate,
};
use shared::util::{is_valid_email, new_id, now_iso};
use shared::{AppError, AppResult, ErrorCode, LiveEventType};

use super::{TicketService, announce, check_id, parse_status, require_official};
use crate::core::config::AlertTargets;
use crate::db::Store;
use crate::db::repository::{IncidentRepository, MessageRepository, TicketRepository};
use crate::live::LiveHub;
use crate::notify::{Channel, NotifyOutcome, Notifier, templates};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};

#[derive(Clone)]
pub struct IncidentService {
    incidents: IncidentRepository,
    tickets: TicketRepository,
    messages: MessageRepository,
    /// Ticket state machine, used for status changes
    lifecycle: TicketService,
    hub: LiveHub,
    notifier: Notifier,
    alerts: AlertTargets,
}

/// Official, or the reporter of `incident`
pub fn can_access(incident: &Incident, actor: &Actor) -> bool {
    actor.is_official() || incident.reporter_id.as_deref() == Some(actor.id.as_str())
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    if let Some(lat) = latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(AppError::validation("latitude must be between -90 and 90")
            .with_detail("field", "latitude"));
    }
    if let Some(lon) = longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        return Err(AppError::validation("longitude must be between -180 and 180")
            .with_detail("field", "longitude"));
    }
    Ok(())
}

fn validate_images(images: &[String]) -> AppResult<()> {
    for url in images {
        validate_required_text(url, "images", MAX_URL_LEN)?;
    }
    Ok(())
}

fn validate_create(input: &IncidentCreate) -> AppResult<()> {
    validate_required_text(&input.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&input.category, "category", MAX_NAME_LEN)?;
    validate_required_text(&input.location, "location", MAX_ADDRESS_LEN)?;
    if input.description.len() > MAX_NOTE_LEN {
        return Err(AppError::validation(format!(
            "description is too long ({} chars, max {MAX_NOTE_LEN})",
            input.description.len()
        ))
        .with_detail("field", "description"));
    }
    validate_coordinates(input.latitude, input.longitude)?;
    validate_images(&input.images)
}

fn validate_update(update: &IncidentUpdate) -> AppResult<()> {
    validate_optional_text(&update.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&update.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&update.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&update.location, "location", MAX_ADDRESS_LEN)?;
    validate_optional_text(&update.assigned_to, "assignedTo", MAX_NAME_LEN)?;
    if let Some(title) = &update.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_coordinates(update.latitude, update.longitude)?;
    if let Some(images) = &update.images {
        validate_images(images)?;
    }
    Ok(())
}

/// Companion ticket for a freshly persisted incident
fn derive_ticket(incident: &Incident) -> Ticket {
    Ticket {
        id: new_id(),
        incident_id: incident.id.clone(),
        title: incident.title.clone(),
        description: incident.description.clone(),
        category: incident.category.clone(),
        priority: incident.priority.unwrap_or_default(),
        status: TicketStatus::Open,
        location: incident.location.clone(),
        latitude: incident.latitude,
        longitude: incident.longitude,
        reported_by: incident.reported_by.clone(),
        reporter_id: incident.reporter_id.clone(),
        reporter_email: incident.reporter_email.clone(),
        reporter_phone: incident.reporter_phone.clone(),
        assigned_to: incident.assigned_to.clone(),
        assignee_phone: None,
        assignee_photo: None,
        assignee_user_id: None,
        assignee_email: None,
        notes: Vec::new(),
        reopen_warning: None,
        reopened_by: None,
        created_at: incident.created_at.clone(),
        updated_at: incident.updated_at.clone(),
    }
}

impl IncidentService {
    pub fn new(
        store: &Store,
        lifecycle: TicketService,
        hub: LiveHub,
        notifier: Notifier,
        alerts: AlertTargets,
    ) -> Self {
        Self {
            incidents: IncidentRepository::new(store),
            tickets: TicketRepository::new(store),
            messages: MessageRepository::new(store),
            lifecycle,
            hub,
            notifier,
            alerts,
        }
    }

    fn load(&self, id: &str) -> AppResult<Incident> {
        check_id(id, "incident")?;
        self.incidents
            .find_by_id(id)?
            .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound).with_detail("id", id))
    }

    fn load_accessible(&self, id: &str, actor: &Actor) -> AppResult<Incident> {
        let incident = self.load(id)?;
        if !can_access(&incident, actor) {
            return Err(AppError::new(ErrorCode::IncidentAccessDenied));
        }
        Ok(incident)
    }

    /// Persist an incident and its ticket in one write, then announce and alert
    ///
    /// `reporter` is `None` for upstream producers such as edge devices.
    pub async fn create(&self, input: IncidentCreate, reporter: Option<&Actor>) -> AppResult<Incident> {
        validate_create(&input)?;

        let now = now_iso();
        let mut incident = Incident {
            id: new_id(),
            title: input.title.trim().to_string(),
            description: input.description,
            category: input.category.trim().to_string(),
            priority: input.priority,
            status: TicketStatus::Open,
            location: input.location.trim().to_string(),
            latitude: input.latitude,
            longitude: input.longitude,
            image_urls: input.images,
            severity: input.severity,
            scope: input.scope,
            source: input.source,
            device_id: input.device_id,
            reported_by: reporter.and_then(Actor::display_name),
            reporter_id: reporter.map(|r| r.id.clone()),
            reporter_email: reporter.and_then(|r| r.email.clone()),
            reporter_phone: reporter.and_then(|r| r.phone.clone()),
            ticket_id: None,
            assigned_to: None,
            assignee_phone: None,
            assignee_photo: None,
            has_messages: false,
            created_at: now.clone(),
            updated_at: now,
        };

        // ticketId is set once here and never cleared
        let ticket = derive_ticket(&incident);
        incident.ticket_id = Some(ticket.id.clone());
        if let Err(e) = self.incidents.create_with_ticket(&incident, &ticket) {
            tracing::error!(incident_id = %incident.id, error = %e, "Incident and ticket not persisted");
            return Err(e.into());
        }

        tracing::info!(
            incident_id = %incident.id,
            ticket_id = %ticket.id,
            source = incident.source.as_deref().unwrap_or("citizen"),
            "Incident created"
        );

        announce(&self.hub, LiveEventType::NewIncident, &incident);
        self.alert_stakeholders(&incident).await;

        Ok(incident)
    }

    /// Edge detection event, created without a reporter
    pub async fn report(&self, report: DetectionReport) -> AppResult<Incident> {
        validate_required_text(&report.description, "description", MAX_NOTE_LEN)?;
        self.create(IncidentCreate::from(report), None).await
    }

    /// Stakeholder email, SMS and WhatsApp plus the reporter confirmation
    ///
    /// Every leg is best-effort; outcomes are returned for inspection only.
    pub async fn alert_stakeholders(&self, incident: &Incident) -> Vec<NotifyOutcome> {
        let mut outcomes = Vec::with_capacity(4);

        let alert_to = self.alerts.email.as_deref().unwrap_or_default();
        outcomes.push(
            self.notifier
                .email("stakeholder_alert", templates::alert_email(alert_to, incident))
                .await,
        );

        let text = templates::alert_text(incident);
        if let Some(phone) = self.alerts.sms.as_deref() {
            outcomes.push(
                self.notifier
                    .message("stakeholder_alert", Channel::Sms, phone, &text)
                    .await,
            );
        }
        if let Some(phone) = self.alerts.whatsapp.as_deref() {
            outcomes.push(
                self.notifier
                    .message("stakeholder_alert", Channel::Whatsapp, phone, &text)
                    .await,
            );
        }

        if let Some(email) = incident.reporter_email.as_deref()
            && is_valid_email(email)
        {
            outcomes.push(
                self.notifier
                    .email(
                        "incident_submitted",
                        templates::incident_submitted_email(email, incident),
                    )
                    .await,
            );
        }

        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, NotifyOutcome::Failed(_)))
            .count();
        if failed > 0 {
            tracing::warn!(incident_id = %incident.id, failed, "Some incident alerts were not delivered");
        }
        outcomes
    }

    /// Official: everything; otherwise only self-reported, newest first
    pub fn list(&self, actor: &Actor) -> AppResult<Vec<Incident>> {
        let scope = (!actor.is_official()).then_some(actor.id.as_str());
        Ok(self.incidents.list(scope)?)
    }

    pub fn stats(&self, actor: &Actor) -> AppResult<IncidentStats> {
        let scope = (!actor.is_official()).then_some(actor.id.as_str());
        Ok(self.incidents.stats(scope)?)
    }

    pub fn get(&self, id: &str, actor: &Actor) -> AppResult<Incident> {
        self.load_accessible(id, actor)
    }

    /// Apply present fields and mirror ticket-relevant ones onto the ticket
    ///
    /// A status change runs through [`TicketService::update_status`], so the
    /// reopen gate, reopen records and notices match the ticket route.
    pub async fn update(&self, id: &str, update: IncidentUpdate, actor: &Actor) -> AppResult<Incident> {
        require_official(actor)?;
        validate_update(&update)?;
        let status = update.status.as_deref().map(parse_status).transpose()?;

        // Refused before any field is written
        let current = self.load(id)?;
        if status == Some(TicketStatus::Open)
            && current.status == TicketStatus::Resolved
            && !actor.is_head_supervisor()
        {
            return Err(AppError::new(ErrorCode::ReopenNotAllowed));
        }

        let now = now_iso();
        let mirror = update.touches_ticket();
        let changes = update.clone();
        let stamp = now.clone();
        let mut incident = self
            .incidents
            .update(id, move |i| {
                if let Some(v) = changes.title {
                    i.title = v.trim().to_string();
                }
                if let Some(v) = changes.description {
                    i.description = v;
                }
                if let Some(v) = changes.category {
                    i.category = v;
                }
                if let Some(v) = changes.priority {
                    i.priority = Some(v);
                }
                if let Some(v) = changes.location {
                    i.location = v;
                }
                if let Some(v) = changes.latitude {
                    i.latitude = Some(v);
                }
                if let Some(v) = changes.longitude {
                    i.longitude = Some(v);
                }
                if let Some(v) = changes.images {
                    i.image_urls = v;
                }
                if let Some(v) = changes.assigned_to {
                    i.assigned_to = Some(v);
                }
                if let Some(v) = changes.severity {
                    i.severity = Some(v);
                }
                if let Some(v) = changes.scope {
                    i.scope = Some(v);
                }
                i.updated_at = stamp;
            })?
            .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound).with_detail("id", id))?;

        if mirror {
            let mirrored = self.tickets.update_by_incident(&incident.id, |t| {
                if update.title.is_some() {
                    t.title = incident.title.clone();
                }
                if update.description.is_some() {
                    t.description = incident.description.clone();
                }
                if update.category.is_some() {
                    t.category = incident.category.clone();
                }
                if let Some(p) = update.priority {
                    t.priority = p;
                }
                if update.location.is_some() {
                    t.location = incident.location.clone();
                }
                if update.latitude.is_some() {
                    t.latitude = incident.latitude;
                }
                if update.longitude.is_some() {
                    t.longitude = incident.longitude;
                }
                if update.assigned_to.is_some() {
                    t.assigned_to = incident.assigned_to.clone();
                }
                t.updated_at = now.clone();
            })?;
            tracing::debug!(incident_id = %incident.id, mirrored, "Mirrored incident update onto tickets");
        }

        if let Some(status) = status {
            incident = self.transition(incident, status, actor).await?;
        }

        tracing::info!(incident_id = %incident.id, by = %actor.id, "Incident updated");
        announce(&self.hub, LiveEventType::IncidentUpdated, &incident);
        Ok(incident)
    }

    /// Status leg of an incident update
    ///
    /// The companion ticket owns the transition and writes the status back
    /// onto the incident. An incident without a ticket is updated directly.
    async fn transition(
        &self,
        incident: Incident,
        status: TicketStatus,
        actor: &Actor,
    ) -> AppResult<Incident> {
        let ticket_id = match incident.ticket_id.clone() {
            Some(id) => Some(id),
            None => self
                .tickets
                .find_by_incident(&incident.id)?
                .into_iter()
                .next()
                .map(|t| t.id),
        };

        let Some(ticket_id) = ticket_id else {
            tracing::warn!(incident_id = %incident.id, "Incident has no ticket, status set directly");
            let id = incident.id.clone();
            return self
                .incidents
                .update(&id, |i| {
                    i.status = status;
                    i.updated_at = now_iso();
                })?
                .ok_or_else(|| AppError::new(ErrorCode::IncidentNotFound).with_detail("id", id));
        };

        let payload = TicketStatusUpdate {
            status: status.to_string(),
            notes: None,
        };
        self.lifecycle.update_status(&ticket_id, payload, actor).await?;
        self.load(&incident.id)
    }

    /// Delete an incident with its messages and tickets
    pub fn delete(&self, id: &str, actor: &Actor) -> AppResult<()> {
        require_official(actor)?;
        check_id(id, "incident")?;
        if !self.incidents.delete(id)? {
            return Err(AppError::new(ErrorCode::IncidentNotFound).with_detail("id", id));
        }
        let messages = self.messages.delete_by_incident(id)?;
        let tickets = self.tickets.delete_by_incident(id)?;
        tracing::info!(incident_id = %id, messages, tickets, by = %actor.id, "Incident deleted");
        announce(
            &self.hub,
            LiveEventType::IncidentDeleted,
            &serde_json::json!({ "id": id }),
        );
        Ok(())
    }

    /// Messages of an accessible incident, oldest first
    pub fn list_messages(&self, incident_id: &str, actor: &Actor) -> AppResult<Vec<Message>> {
        self.load_accessible(incident_id, actor)?;
        Ok(self.messages.list_by_incident(incident_id)?)
    }

    pub fn create_message(
        &self,
        incident_id: &str,
        input: MessageCreate,
        actor: &Actor,
    ) -> AppResult<Message> {
        validate_required_text(&input.message, "message", MAX_NOTE_LEN)?;
        self.load_accessible(incident_id, actor)?;

        let now = now_iso();
        let message = Message {
            id: new_id(),
            incident_id: incident_id.to_string(),
            message: input.message.trim().to_string(),
            sender_id: actor.id.clone(),
            sender_name: actor.display_name().unwrap_or_default(),
            created_at: now.clone(),
        };
        self.messages.create(&message)?;
        self.incidents.update(incident_id, |i| {
            i.has_messages = true;
            i.updated_at = now;
        })?;
        Ok(message)
    }

    /// Tickets referencing an incident (used by tests and tools)
    pub fn tickets_of(&self, incident_id: &str) -> AppResult<Vec<Ticket>> {
        Ok(self.tickets.find_by_incident(incident_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    fn actor(id: &str, role: Role) -> Actor {
        Actor {
            id: id.into(),
            name: id.into(),
            email: None,
            phone: None,
            role,
        }
    }

    fn incident(reporter: Option<&str>) -> Incident {
        Incident {
            id: new_id(),
            title: "t".into(),
            description: String::new(),
            category: "road".into(),
            priority: None,
            status: TicketStatus::Open,
            location: "x".into(),
            latitude: None,
            longitude: None,
            image_urls: Vec::new(),
            severity: None,
            scope: None,
            source: None,
            device_id: None,
            reported_by: None,
            reporter_id: reporter.map(Into::into),
            reporter_email: None,
            reporter_phone: None,
            ticket_id: None,
            assigned_to: None,
            assignee_phone: None,
            assignee_photo: None,
            has_messages: false,
            created_at: now_iso(),
            updated_at: now_iso(),
        }
    }

    #[test]
    fn test_can_access() {
        let own = incident(Some("u1"));
        let anonymous = incident(None);
        assert!(can_access(&own, &actor("u1", Role::Citizen)));
        assert!(!can_access(&own, &actor("u2", Role::Citizen)));
        assert!(!can_access(&anonymous, &actor("u2", Role::Citizen)));
        assert!(can_access(&anonymous, &actor("o1", Role::Official)));
        assert!(can_access(&own, &actor("h1", Role::HeadSupervisor)));
    }

    #[test]
    fn test_derive_ticket_defaults() {
        let i = incident(Some("u1"));
        let t = derive_ticket(&i);
        assert_eq!(t.incident_id, i.id);
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.priority, shared::models::Priority::Medium);
        assert_eq!(t.reporter_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_validate_create() {
        let ok = IncidentCreate {
            title: "Pothole".into(),
            category: "road".into(),
            location: "Main St".into(),
            ..Default::default()
        };
        assert!(validate_create(&ok).is_ok());

        let no_title = IncidentCreate {
            title: "  ".into(),
            ..ok.clone()
        };
        assert!(validate_create(&no_title).is_err());

        let bad_lat = IncidentCreate {
            latitude: Some(123.0),
            ..ok
        };
        assert_eq!(
            validate_create(&bad_lat).unwrap_err().details.unwrap()["field"],
            "latitude"
        );
    }
}
