//! Dashboard and public aggregates
//!
//! Computed on demand from the incident and ticket collections. The
//! aggregation functions are pure over slices so the numbers can be checked
//! without a store.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use shared::models::{
    Actor, CategoryCount, Dashboard, HeatPoint, Incident, Priority, PublicSummary, RecentIncident,
    SAFETY_CATEGORIES, StatusCounts, Ticket, TicketStatus, TrendPoint, TrendQuery,
    WorkerProductivity, percent,
};
use shared::AppResult;

use super::require_official;
use crate::db::Store;
use crate::db::repository::{IncidentRepository, TicketRepository};

/// Entries in the public summary's recent list
const RECENT_LIMIT: usize = 5;

#[derive(Clone)]
pub struct AnalyticsService {
    incidents: IncidentRepository,
    tickets: TicketRepository,
}

fn priority_weight(priority: Option<Priority>) -> f64 {
    match priority.unwrap_or_default() {
        Priority::Low => 0.5,
        Priority::Medium => 1.0,
        Priority::High => 1.5,
        Priority::Critical => 2.0,
    }
}

/// Incidents per category, largest first
pub fn by_category(incidents: &[Incident]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for incident in incidents {
        let category = incident.category.trim();
        let key = if category.is_empty() { "unknown" } else { category };
        *counts.entry(key.to_string()).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    // stable sort keeps ties in name order
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Per-assignee ticket counts, most resolved first
pub fn worker_productivity(tickets: &[Ticket]) -> Vec<WorkerProductivity> {
    let mut per_worker: BTreeMap<&str, Vec<TicketStatus>> = BTreeMap::new();
    for ticket in tickets {
        if let Some(worker) = ticket.assigned_to.as_deref().filter(|w| !w.trim().is_empty()) {
            per_worker.entry(worker).or_default().push(ticket.status);
        }
    }
    let mut out: Vec<WorkerProductivity> = per_worker
        .into_iter()
        .map(|(worker, statuses)| {
            let counts = StatusCounts::tally(statuses);
            WorkerProductivity {
                worker: worker.to_string(),
                total: counts.total,
                resolved: counts.resolved,
                open: counts.open,
                in_progress: counts.in_progress,
                resolution_rate: percent(counts.resolved, counts.total),
            }
        })
        .collect();
    out.sort_by(|a, b| b.resolved.cmp(&a.resolved));
    out
}

pub fn dashboard(incidents: &[Incident], tickets: &[Ticket]) -> Dashboard {
    let incident_counts = StatusCounts::tally(incidents.iter().map(|i| i.status));
    let ticket_counts = StatusCounts::tally(tickets.iter().map(|t| t.status));
    let safety = incidents
        .iter()
        .filter(|i| SAFETY_CATEGORIES.contains(&i.category.as_str()))
        .count() as f64;

    Dashboard {
        city_cleanliness_score: percent(incident_counts.resolved, incident_counts.total),
        safety_index: (100.0 - safety * 3.0).max(0.0),
        incidents: incident_counts,
        tickets: ticket_counts,
        by_category: by_category(incidents),
        worker_productivity: worker_productivity(tickets),
    }
}

/// Geolocated incidents weighted by priority, resolved ones damped
pub fn heatmap(incidents: &[Incident]) -> Vec<HeatPoint> {
    incidents
        .iter()
        .filter_map(|i| {
            let (lat, lng) = (i.latitude?, i.longitude?);
            let mut weight = priority_weight(i.priority);
            if i.status == TicketStatus::Resolved {
                weight = (weight - 0.6).max(0.2);
            }
            Some(HeatPoint {
                lat,
                lng,
                weight,
                category: i.category.clone(),
                status: i.status,
            })
        })
        .collect()
}

/// Created and resolved counts for the `days` UTC days ending at `today`
///
/// Resolution is dated by the incident's last update.
pub fn trends(incidents: &[Incident], days: i64, today: NaiveDate) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = (0..days)
        .rev()
        .map(|back| TrendPoint {
            date: (today - Duration::days(back)).format("%Y-%m-%d").to_string(),
            created: 0,
            resolved: 0,
        })
        .collect();

    let slot = |stamp: &str| {
        let day = stamp.get(..10)?;
        points.iter().position(|p| p.date == day)
    };
    let mut created = Vec::new();
    let mut resolved = Vec::new();
    for incident in incidents {
        created.extend(slot(&incident.created_at));
        if incident.status == TicketStatus::Resolved {
            resolved.extend(slot(&incident.updated_at));
        }
    }
    for idx in created {
        points[idx].created += 1;
    }
    for idx in resolved {
        points[idx].resolved += 1;
    }
    points
}

pub fn public_summary(incidents: &[Incident]) -> PublicSummary {
    let counts = StatusCounts::tally(incidents.iter().map(|i| i.status));
    let mut newest: Vec<&Incident> = incidents.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent = newest
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|i| RecentIncident {
            id: i.id.clone(),
            title: i.title.clone(),
            category: i.category.clone(),
            status: i.status,
            location: i.location.clone(),
            created_at: i.created_at.clone(),
        })
        .collect();

    PublicSummary {
        resolution_rate: percent(counts.resolved, counts.total),
        total: counts.total,
        resolved: counts.resolved,
        open: counts.open,
        in_progress: counts.in_progress,
        recent,
    }
}

impl AnalyticsService {
    pub fn new(store: &Store) -> Self {
        Self {
            incidents: IncidentRepository::new(store),
            tickets: TicketRepository::new(store),
        }
    }

    pub fn dashboard(&self, actor: &Actor) -> AppResult<Dashboard> {
        require_official(actor)?;
        Ok(dashboard(&self.incidents.all()?, &self.tickets.all()?))
    }

    pub fn heatmap(&self, actor: &Actor) -> AppResult<Vec<HeatPoint>> {
        require_official(actor)?;
        Ok(heatmap(&self.incidents.all()?))
    }

    pub fn trends(&self, query: &TrendQuery, actor: &Actor) -> AppResult<Vec<TrendPoint>> {
        require_official(actor)?;
        let today = Utc::now().date_naive();
        Ok(trends(&self.incidents.all()?, query.window(), today))
    }

    /// Unauthenticated transparency summary
    pub fn public_summary(&self) -> AppResult<PublicSummary> {
        Ok(public_summary(&self.incidents.all()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident(category: &str, status: TicketStatus, created: &str) -> Incident {
        Incident {
            id: shared::util::new_id(),
            title: format!("{category} issue"),
            description: String::new(),
            category: category.into(),
            priority: None,
            status,
            location: "Main St".into(),
            latitude: None,
            longitude: None,
            image_urls: Vec::new(),
            severity: None,
            scope: None,
            source: None,
            device_id: None,
            reported_by: None,
            reporter_id: None,
            reporter_email: Some("asha@example.com".into()),
            reporter_phone: None,
            ticket_id: None,
            assigned_to: None,
            assignee_phone: None,
            assignee_photo: None,
            has_messages: false,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    fn ticket(worker: Option<&str>, status: TicketStatus) -> Ticket {
        Ticket {
            id: shared::util::new_id(),
            incident_id: shared::util::new_id(),
            title: "t".into(),
            description: String::new(),
            category: "road".into(),
            priority: Priority::Medium,
            status,
            location: "x".into(),
            latitude: None,
            longitude: None,
            reported_by: None,
            reporter_id: None,
            reporter_email: None,
            reporter_phone: None,
            assigned_to: worker.map(Into::into),
            assignee_phone: None,
            assignee_photo: None,
            assignee_user_id: None,
            assignee_email: None,
            notes: Vec::new(),
            reopen_warning: None,
            reopened_by: None,
            created_at: "2026-10-01T00:00:00.000Z".into(),
            updated_at: "2026-10-01T00:00:00.000Z".into(),
        }
    }

    const DAY: &str = "2026-10-01T08:00:00.000Z";

    #[test]
    fn test_dashboard_scores() {
        let incidents = vec![
            incident("road", TicketStatus::Resolved, DAY),
            incident("road", TicketStatus::Open, DAY),
            incident("fire", TicketStatus::InProgress, DAY),
            incident("", TicketStatus::Open, DAY),
        ];
        let d = dashboard(&incidents, &[]);
        assert_eq!(d.incidents.total, 4);
        assert_eq!(d.incidents.resolved, 1);
        assert_eq!(d.city_cleanliness_score, 25.0);
        assert_eq!(d.safety_index, 97.0);
        assert_eq!(d.by_category[0].category, "road");
        assert_eq!(d.by_category[0].count, 2);
        assert!(d.by_category.iter().any(|c| c.category == "unknown"));
    }

    #[test]
    fn test_safety_index_floors_at_zero() {
        let incidents: Vec<Incident> = (0..40)
            .map(|_| incident("crowd", TicketStatus::Open, DAY))
            .collect();
        assert_eq!(dashboard(&incidents, &[]).safety_index, 0.0);
        assert_eq!(dashboard(&[], &[]).city_cleanliness_score, 0.0);
    }

    #[test]
    fn test_worker_productivity() {
        let tickets = vec![
            ticket(Some("Ravi"), TicketStatus::Resolved),
            ticket(Some("Ravi"), TicketStatus::Open),
            ticket(Some("Meena"), TicketStatus::Resolved),
            ticket(Some("Meena"), TicketStatus::Resolved),
            ticket(Some("Meena"), TicketStatus::InProgress),
            ticket(None, TicketStatus::Resolved),
        ];
        let rows = worker_productivity(&tickets);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].worker, "Meena");
        assert_eq!(rows[0].resolved, 2);
        assert_eq!(rows[0].in_progress, 1);
        assert_eq!(rows[0].resolution_rate, 66.67);
        assert_eq!(rows[1].worker, "Ravi");
        assert_eq!(rows[1].resolution_rate, 50.0);
    }

    #[test]
    fn test_heatmap_weights() {
        let mut critical = incident("road", TicketStatus::Open, DAY);
        critical.priority = Some(Priority::Critical);
        critical.latitude = Some(12.9);
        critical.longitude = Some(77.6);
        let mut low_resolved = incident("road", TicketStatus::Resolved, DAY);
        low_resolved.priority = Some(Priority::Low);
        low_resolved.latitude = Some(13.0);
        low_resolved.longitude = Some(77.5);
        let mut unset = incident("road", TicketStatus::Resolved, DAY);
        unset.latitude = Some(13.1);
        unset.longitude = Some(77.4);
        let nowhere = incident("road", TicketStatus::Open, DAY);

        let points = heatmap(&[critical, low_resolved, unset, nowhere]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].weight, 2.0);
        assert_eq!(points[1].weight, 0.2);
        assert!((points[2].weight - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_trends_buckets_by_day() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let mut fixed = incident("road", TicketStatus::Resolved, "2026-10-10T09:00:00.000Z");
        fixed.updated_at = "2026-10-14T07:00:00.000Z".into();
        let incidents = vec![
            fixed,
            incident("road", TicketStatus::Open, "2026-10-14T01:00:00.000Z"),
            incident("road", TicketStatus::Open, "2026-09-01T01:00:00.000Z"),
        ];

        let points = trends(&incidents, 7, today);
        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, "2026-10-08");
        assert_eq!(points[6].date, "2026-10-14");
        assert_eq!(points[2].created, 1);
        assert_eq!(points[6].created, 1);
        assert_eq!(points[6].resolved, 1);
        assert_eq!(points.iter().map(|p| p.created).sum::<u64>(), 2);
    }

    #[test]
    fn test_public_summary_hides_reporters() {
        let incidents: Vec<Incident> = (1..=7)
            .map(|d| incident("road", TicketStatus::Open, &format!("2026-10-0{d}T00:00:00.000Z")))
            .collect();
        let summary = public_summary(&incidents);
        assert_eq!(summary.total, 7);
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[0].created_at, "2026-10-07T00:00:00.000Z");

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["recent"][0].get("reporterEmail").is_none());
        assert_eq!(json["resolutionRate"], 0.0);
    }
}
