//! Prometheus metrics exposition.

use prometheus::{
    histogram_opts, opts, Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder,
};

/// Gateway metric families, registered against a private registry so tests
/// can instantiate as many gateways as they like without collisions.
pub struct Metrics {
    registry: Registry,
    pub request_total: IntCounterVec,
    pub request_duration: HistogramVec,
    pub key_usage_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let request_total = IntCounterVec::new(
            opts!("request_total", "Total number of HTTP requests processed."),
            &["method", "path", "status"],
        )
        .expect("valid metric definition");

        let request_duration = HistogramVec::new(
            histogram_opts!(
                "request_duration_seconds",
                "Duration of HTTP requests in seconds."
            ),
            &["method", "path"],
        )
        .expect("valid metric definition");

        let key_usage_total = IntCounterVec::new(
            opts!("key_usage_total", "Number of times a virtual key was used."),
            &["key"],
        )
        .expect("valid metric definition");

        registry
            .register(Box::new(request_total.clone()))
            .expect("register request_total");
        registry
            .register(Box::new(request_duration.clone()))
            .expect("register request_duration");
        registry
            .register(Box::new(key_usage_total.clone()))
            .expect("register key_usage_total");

        Self {
            registry,
            request_total,
            request_duration,
            key_usage_total,
        }
    }

    /// Render the registry in the Prometheus text format.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(err) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %err, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
