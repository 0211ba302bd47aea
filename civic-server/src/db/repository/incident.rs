//! Incident Repository

use super::RepoResult;
use crate::db::storage::{Collection, Document, Store};
use shared::models::{Incident, IncidentStats, Ticket, TicketStatus};

impl Document for Incident {
    const TABLE: &'static str = "incidents";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct IncidentRepository {
    col: Collection<Incident>,
}

impl IncidentRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            col: store.collection(),
        }
    }

    /// Persist an incident together with its companion ticket
    ///
    /// One write transaction: either both documents exist afterwards or
    /// neither does.
    pub fn create_with_ticket(&self, incident: &Incident, ticket: &Ticket) -> RepoResult<()> {
        Ok(self.col.insert_with(incident, ticket)?)
    }

    pub fn all(&self) -> RepoResult<Vec<Incident>> {
        Ok(self.col.find(|_| true)?)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Incident>> {
        Ok(self.col.get(id)?)
    }

    /// Newest first; `reporter_id` scopes to one reporter's incidents
    pub fn list(&self, reporter_id: Option<&str>) -> RepoResult<Vec<Incident>> {
        Ok(self.col.find_sorted(
            |i| reporter_id.is_none_or(|r| i.reporter_id.as_deref() == Some(r)),
            |a, b| b.created_at.cmp(&a.created_at),
        )?)
    }

    /// Atomic read-modify-write
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut Incident)) -> RepoResult<Option<Incident>> {
        Ok(self.col.update(id, mutate)?)
    }

    pub fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self.col.delete(id)?)
    }

    /// Status counters, scoped like [`Self::list`]
    pub fn stats(&self, reporter_id: Option<&str>) -> RepoResult<IncidentStats> {
        let visible = self.list(reporter_id)?;
        let count = |s: TicketStatus| visible.iter().filter(|i| i.status == s).count() as u64;
        let open = count(TicketStatus::Open);
        Ok(IncidentStats {
            total: visible.len() as u64,
            open,
            pending: open,
            in_progress: count(TicketStatus::InProgress),
            resolved: count(TicketStatus::Resolved),
        })
    }
}
