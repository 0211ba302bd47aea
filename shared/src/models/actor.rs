//! Actor Model
//!
//! The authenticated caller of a service operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role
///
/// `HeadSupervisor` is a strict superset of `Official`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Citizen,
    Official,
    HeadSupervisor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Official => "official",
            Self::HeadSupervisor => "head_supervisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
}

impl Actor {
    /// Officials and head supervisors
    pub fn is_official(&self) -> bool {
        matches!(self.role, Role::Official | Role::HeadSupervisor)
    }

    /// Holds the reopen capability
    pub fn is_head_supervisor(&self) -> bool {
        self.role == Role::HeadSupervisor
    }

    /// Display name for reporter snapshots: name, else email, else phone
    pub fn display_name(&self) -> Option<String> {
        [Some(&self.name), self.email.as_ref(), self.phone.as_ref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .cloned()
    }
}

/// Lightweight `{id, name}` reference to an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: String,
    pub name: String,
}

impl From<&Actor> for ActorRef {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            name: actor.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: "u1".into(),
            name: String::new(),
            email: Some("a@b.in".into()),
            phone: None,
            role,
        }
    }

    #[test]
    fn test_role_capabilities() {
        assert!(!actor(Role::Citizen).is_official());
        assert!(actor(Role::Official).is_official());
        assert!(!actor(Role::Official).is_head_supervisor());
        assert!(actor(Role::HeadSupervisor).is_official());
        assert!(actor(Role::HeadSupervisor).is_head_supervisor());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(actor(Role::Citizen).display_name().as_deref(), Some("a@b.in"));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::HeadSupervisor).unwrap(),
            "\"head_supervisor\""
        );
    }
}
