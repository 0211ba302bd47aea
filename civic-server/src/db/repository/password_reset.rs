//! Password Reset Repository

use super::RepoResult;
use crate::db::storage::{Collection, Document, Store};
use shared::models::PasswordReset;

impl Document for PasswordReset {
    const TABLE: &'static str = "password_resets";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Clone)]
pub struct PasswordResetRepository {
    col: Collection<PasswordReset>,
}

impl PasswordResetRepository {
    pub fn new(store: &Store) -> Self {
        Self {
            col: store.collection(),
        }
    }

    pub fn create(&self, record: &PasswordReset) -> RepoResult<()> {
        Ok(self.col.insert(record)?)
    }

    /// Unused, unexpired record for `token`
    pub fn find_redeemable(&self, token: &str, now_ms: i64) -> RepoResult<Option<PasswordReset>> {
        Ok(self
            .col
            .find_one(|r| r.token == token && r.is_redeemable(now_ms))?)
    }

    /// Mark used; `false` when it was already used or missing
    pub fn mark_used(&self, id: &str, used_at: &str) -> RepoResult<bool> {
        let mut newly_used = false;
        self.col.update(id, |r| {
            if !r.used {
                r.used = true;
                r.used_at = Some(used_at.to_string());
                newly_used = true;
            }
        })?;
        Ok(newly_used)
    }

    /// Drop records that expired before `now_ms`
    pub fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        Ok(self.col.delete_where(|r| r.expires_at < now_ms)?)
    }
}
