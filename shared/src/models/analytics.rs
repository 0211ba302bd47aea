//! Analytics Model
//!
//! Read-only aggregates for the operations dashboard and the public
//! transparency page. Nothing here is persisted.

use super::ticket::TicketStatus;
use serde::{Deserialize, Serialize};

/// Default trend window in days
pub const DEFAULT_TREND_DAYS: i64 = 14;
/// Accepted trend window, inclusive
pub const MIN_TREND_DAYS: i64 = 7;
pub const MAX_TREND_DAYS: i64 = 60;

/// Categories counted against the safety index
pub const SAFETY_CATEGORIES: [&str; 4] = ["safety", "fire", "emergency", "crowd"];

/// `part / total` as a percentage with two decimals, 0 when `total` is 0
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Per-status counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

impl StatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = TicketStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.total += 1;
            match status {
                TicketStatus::Open => counts.open += 1,
                TicketStatus::InProgress => counts.in_progress += 1,
                TicketStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Ticket throughput of one assignee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProductivity {
    pub worker: String,
    pub total: u64,
    pub resolved: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolution_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub incidents: StatusCounts,
    pub tickets: StatusCounts,
    /// Resolved share of all incidents, in percent
    pub city_cleanliness_score: f64,
    /// 100 minus 3 per safety-category incident, floored at 0
    pub safety_index: f64,
    pub by_category: Vec<CategoryCount>,
    pub worker_productivity: Vec<WorkerProductivity>,
}

/// Weighted map point for one geolocated incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub weight: f64,
    pub category: String,
    pub status: TicketStatus,
}

/// Incidents created and resolved on one UTC day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub created: u64,
    pub resolved: u64,
}

/// `GET /api/analytics/trends` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQuery {
    #[serde(default)]
    pub days: Option<i64>,
}

impl TrendQuery {
    /// Requested window clamped to the accepted range
    pub fn window(&self) -> i64 {
        self.days
            .unwrap_or(DEFAULT_TREND_DAYS)
            .clamp(MIN_TREND_DAYS, MAX_TREND_DAYS)
    }
}

/// Public view of a recent incident, no reporter data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIncident {
    pub id: String,
    pub title: String,
    pub category: String,
    pub status: TicketStatus,
    pub location: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSummary {
    pub total: u64,
    pub resolved: u64,
    pub open: u64,
    pub in_progress: u64,
    pub resolution_rate: f64,
    /// Newest first, at most five
    pub recent: Vec<RecentIncident>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
        assert_eq!(percent(4, 4), 100.0);
    }

    #[test]
    fn test_trend_window_is_clamped() {
        assert_eq!(TrendQuery::default().window(), 14);
        assert_eq!(TrendQuery { days: Some(1) }.window(), 7);
        assert_eq!(TrendQuery { days: Some(30) }.window(), 30);
        assert_eq!(TrendQuery { days: Some(365) }.window(), 60);
    }

    #[test]
    fn test_tally() {
        let counts = StatusCounts::tally([
            TicketStatus::Open,
            TicketStatus::Resolved,
            TicketStatus::Resolved,
        ]);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.open, 1);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.resolved, 2);

        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["inProgress"], 0);
    }
}
