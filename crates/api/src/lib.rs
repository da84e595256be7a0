//! HTTP surface of the Bifrost gateway.
//!
//! Composes the gateway aggregate, the middleware stack (authenticator,
//! org-context resolver, rate limiter), the administrative CRUD handlers,
//! and the proxy engine into an axum router.

pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use metrics::Metrics;
pub use routes::router;
pub use state::{Gateway, GatewayBuilder};
