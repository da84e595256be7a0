//! Liveness, version, demo, and metrics endpoints.

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::Gateway;

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /version
pub async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

/// GET /v1/hello
pub async fn hello() -> &'static str {
    "hello world"
}

/// GET /metrics (mounted only when metrics are enabled)
pub async fn metrics(State(gateway): State<Gateway>) -> String {
    gateway
        .metrics()
        .map(|m| m.render())
        .unwrap_or_default()
}
