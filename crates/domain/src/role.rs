//! Membership roles within an organization.

use serde::{Deserialize, Serialize};

/// Permission level of a user inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative control over the organization and its members.
    Owner,
    /// Can manage organization resources but cannot remove or demote owners.
    Admin,
    /// Regular member with access limited to permitted resources.
    #[default]
    Member,
}

impl Role {
    /// Parse a role from its wire form. Returns `None` for anything outside
    /// the allowed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }

    /// Check if this role can perform admin actions.
    pub fn can_admin(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
            Role::Member => write!(f, "member"),
        }
    }
}
