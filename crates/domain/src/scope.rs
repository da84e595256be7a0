//! Virtual-key permission scopes.

use http::Method;
use serde::{Deserialize, Serialize};

/// Permission scope of a virtual key. The set is closed: anything outside
/// it is rejected at creation and treated as forbidden at proxy time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "key_scope", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Allows GET and HEAD requests only.
    Read,
    /// Allows all request methods.
    Write,
}

impl Scope {
    /// Parse a scope from its wire form. Returns `None` for anything
    /// outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Scope::Read),
            "write" => Some(Scope::Write),
            _ => None,
        }
    }

    /// Whether this scope permits the given HTTP method.
    pub fn allows_method(&self, method: &Method) -> bool {
        match self {
            Scope::Read => matches!(*method, Method::GET | Method::HEAD),
            Scope::Write => true,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Read => write!(f, "read"),
            Scope::Write => write!(f, "write"),
        }
    }
}
