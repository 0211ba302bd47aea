//! User Repository
//!
//! Also the [`UserDirectory`] the lifecycle services consult for contact
//! lookups.

use super::RepoResult;
use crate::db::storage::{Collection, Document, Store};
use crate::utils::phone::phones_match;
use shared::models::User;

impl Document for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only user lookups
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<User>>;

    /// Case-insensitive match
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Any user whose phone matches one of the variants of `phone`
    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<User>>;

    /// Like [`Self::find_by_phone`] restricted to officials
    fn find_official_by_phone(&self, phone: &str) -> RepoResult<Option<User>>;
}

#[derive(Clone)]
pub struct UserRepository {
    col: Collection<User>,
    country_code: String,
}

impl UserRepository {
    pub fn new(store: &Store, country_code: impl Into<String>) -> Self {
        Self {
            col: store.collection(),
            country_code: country_code.into(),
        }
    }

    pub fn create(&self, user: &User) -> RepoResult<()> {
        Ok(self.col.insert(user)?)
    }

    /// Replace the password hash; `false` when the user is unknown
    pub fn set_password_hash(&self, id: &str, hash: String, now: &str) -> RepoResult<bool> {
        Ok(self
            .col
            .update(id, |u| {
                u.password_hash = Some(hash);
                u.updated_at = now.to_string();
            })?
            .is_some())
    }

    fn find_by_phone_where(&self, phone: &str, extra: impl Fn(&User) -> bool) -> RepoResult<Option<User>> {
        if phone.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.col.find_one(|u| {
            extra(u)
                && u.phone
                    .as_deref()
                    .is_some_and(|p| phones_match(p, phone, &self.country_code))
        })?)
    }
}

impl UserDirectory for UserRepository {
    fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        Ok(self.col.get(id)?)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let needle = email.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self.col.find_one(|u| {
            u.email
                .as_deref()
                .is_some_and(|e| e.trim().to_ascii_lowercase() == needle)
        })?)
    }

    fn find_by_phone(&self, phone: &str) -> RepoResult<Option<User>> {
        self.find_by_phone_where(phone, |_| true)
    }

    fn find_official_by_phone(&self, phone: &str) -> RepoResult<Option<User>> {
        self.find_by_phone_where(phone, User::is_official)
    }
}
