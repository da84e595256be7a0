//! Domain entities for the Bifrost gateway.
//!
//! Entities are small records keyed by opaque string ids (UUIDs in
//! practice, but the stores treat them as plain strings). Cross-entity
//! references are always by id, never by shared handle; deletions do not
//! cascade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use bifrost_common::{Error, Result};

use crate::role::Role;
use crate::scope::Scope;

/// An API user able to authenticate to the gateway.
///
/// `api_key` is unique across users and maps to at most one user; the user
/// store maintains that index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub api_key: String,
}

impl User {
    /// Create a new user with validation.
    pub fn new(id: String, name: String, email: String, api_key: String) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::Validation("invalid request".to_string()));
        }
        if !email.validate_email() {
            return Err(Error::Validation("invalid email".to_string()));
        }
        Ok(User {
            id,
            name,
            email,
            api_key,
        })
    }
}

/// A tenant grouping users and gateway resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub email: String,
}

/// Association between a user and an organization. The `(user_id, org_id)`
/// pair is the primary key: one role per user per organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub user_id: String,
    pub org_id: String,
    pub role: Role,
}

/// A short-lived key granting callers access to one target service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VirtualKey {
    pub id: String,
    pub scope: Scope,
    pub expires_at: DateTime<Utc>,
    pub target: String,
    pub rate_limit: i64,
}

impl VirtualKey {
    /// Whether the key has passed its expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Creation-time invariants: positive rate limit, future expiry.
    /// Target existence is checked against the service store by the caller.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.rate_limit <= 0 {
            return Err(Error::Validation("invalid rate_limit".to_string()));
        }
        if self.expires_at <= now {
            return Err(Error::Validation(
                "expires_at must be in the future".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered upstream endpoint bound to a root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: String,
    pub endpoint: String,
    pub root_key_id: String,
}

/// Long-lived upstream credential. Never returned in a response body after
/// creation; `Debug` redacts the key material so it cannot reach the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RootKey {
    pub id: String,
    pub api_key: String,
}

impl std::fmt::Debug for RootKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootKey")
            .field("id", &self.id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
