//! Ticket Repository

use super::RepoResult;
use crate::db::storage::{Collection, Document, Store};
use shared::models::{Ticket, TicketFilter};

impl Document for Ticket {
    const TABLE: &'static str = "tickets";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct TicketRepository {
    col: Collection<Ticket>,
}

impl TicketRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            col: store.collection(),
        }
    }

    /// Test-only seeding; production tickets are created via `IncidentRepository::create_with_ticket`
    #[cfg(test)]
    pub(crate) fn create(&self, ticket: &Ticket) -> RepoResult<()> {
        Ok(self.col.insert(ticket)?)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Ticket>> {
        Ok(self.col.get(id)?)
    }

    /// Tickets referencing an incident, oldest first
    pub fn find_by_incident(&self, incident_id: &str) -> RepoResult<Vec<Ticket>> {
        Ok(self.col.find_sorted(
            |t| t.incident_id == incident_id,
            |a, b| a.created_at.cmp(&b.created_at),
        )?)
    }

    /// Filtered listing, newest first
    pub fn list(&self, filter: &TicketFilter) -> RepoResult<Vec<Ticket>> {
        Ok(self.col.find_sorted(
            |t| filter.matches(t),
            |a, b| b.created_at.cmp(&a.created_at),
        )?)
    }

    pub fn all(&self) -> RepoResult<Vec<Ticket>> {
        Ok(self.col.find(|_| true)?)
    }

    /// Atomic read-modify-write
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut Ticket)) -> RepoResult<Option<Ticket>> {
        Ok(self.col.update(id, mutate)?)
    }

    /// Apply `mutate` to every ticket of an incident
    pub fn update_by_incident(
        &self,
        incident_id: &str,
        mutate: impl FnMut(&mut Ticket),
    ) -> RepoResult<usize> {
        Ok(self.col.update_where(|t| t.incident_id == incident_id, mutate)?)
    }

    pub fn delete_by_incident(&self, incident_id: &str) -> RepoResult<usize> {
        Ok(self.col.delete_where(|t| t.incident_id == incident_id)?)
    }
}
