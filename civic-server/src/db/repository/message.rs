//! Message Repository

use super::RepoResult;
use crate::db::storage::{Collection, Document, Store};
use shared::models::Message;

impl Document for Message {
    const TABLE: &'static str = "messages";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct MessageRepository {
    col: Collection<Message>,
}

impl MessageRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            col: store.collection(),
        }
    }

    pub fn create(&self, message: &Message) -> RepoResult<()> {
        Ok(self.col.insert(message)?)
    }

    /// Oldest first
    pub fn list_by_incident(&self, incident_id: &str) -> RepoResult<Vec<Message>> {
        Ok(self.col.find_sorted(
            |m| m.incident_id == incident_id,
            |a, b| a.created_at.cmp(&b.created_at),
        )?)
    }

    pub fn delete_by_incident(&self, incident_id: &str) -> RepoResult<usize> {
        Ok(self.col.delete_where(|m| m.incident_id == incident_id)?)
    }
}
