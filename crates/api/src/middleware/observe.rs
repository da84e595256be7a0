//! Request logging and metrics recording.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::Gateway;

/// Records method, path, status, and duration for every request, and feeds
/// the Prometheus counters when metrics are enabled.
pub async fn track(State(gateway): State<Gateway>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    tracing::info!(
        method = %method,
        path = %path,
        status = status,
        duration_ms = elapsed.as_millis() as u64,
        "request"
    );

    if let Some(metrics) = gateway.metrics() {
        metrics
            .request_total
            .with_label_values(&[method.as_str(), &path, &status.to_string()])
            .inc();
        metrics
            .request_duration
            .with_label_values(&[method.as_str(), &path])
            .observe(elapsed.as_secs_f64());
    }

    response
}
