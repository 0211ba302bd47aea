//! User Model

use super::actor::{Actor, Role};
use serde::{Deserialize, Serialize};

/// User account record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub user_type: Role,
    /// Argon2 PHC string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_official(&self) -> bool {
        matches!(self.user_type, Role::Official | Role::HeadSupervisor)
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.user_type,
        }
    }
}
