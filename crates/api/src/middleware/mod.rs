//! Middleware stack for the gateway.
//!
//! Request-plane order on protected routes is fixed: authenticator, then
//! org-context resolver, then (on the proxy route) the rate limiter. Each
//! stage either passes the request through or emits the final response.

pub mod auth;
pub mod observe;
pub mod org_ctx;
pub mod rate_limit;

pub use auth::require_api_key;
pub use observe::track;
pub use org_ctx::{resolve_org_context, Requester};
pub use rate_limit::enforce_rate_limit;
