//! Per-key rate limiting over the shared counter store.
//!
//! The shared increment is the primary path. Any shared-store error is
//! logged and recovered with the process-local counter keyed by the same
//! bucket id; that keeps the gateway available at the cost of per-replica
//! instead of global accounting. The local counter is never promoted to
//! primary.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use bifrost_common::Error;
use bifrost_db::{CounterStore, VirtualKeyStore};

use crate::state::Gateway;

const BUCKET_TTL: Duration = Duration::from_secs(60);

/// Bucket id for a virtual key in the current minute.
fn bucket_id(key_id: &str, now_unix: i64) -> String {
    format!("ratelimit:{}:{}", key_id, now_unix / 60)
}

/// Virtual-key id from the `X-Virtual-Key` header or the `key` query
/// parameter. The limiter only reads it; the proxy engine owns removal.
fn virtual_key_id(req: &Request) -> Option<String> {
    if let Some(id) = req
        .headers()
        .get("x-virtual-key")
        .and_then(|v| v.to_str().ok())
    {
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "key")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Rate-limiter middleware for the proxy route.
pub async fn enforce_rate_limit(
    State(gateway): State<Gateway>,
    req: Request,
    next: Next,
) -> Response {
    // No key, or a key the store does not know: pass through; the proxy
    // engine rejects with its own, more specific error.
    let key_id = match virtual_key_id(&req) {
        Some(id) => id,
        None => return next.run(req).await,
    };
    let key = match gateway.keys().get(&key_id).await {
        Ok(key) => key,
        Err(_) => return next.run(req).await,
    };

    let bucket = bucket_id(&key_id, Utc::now().timestamp());

    let count = match gateway.shared_counter().incr(&bucket).await {
        Ok(count) => {
            if count == 1 {
                if let Err(err) = gateway.shared_counter().expire(&bucket, BUCKET_TTL).await {
                    tracing::warn!(error = %err, bucket = %bucket, "failed to set bucket expiry");
                }
            }
            count
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                bucket = %bucket,
                "shared counter unavailable, falling back to local counter"
            );
            gateway.local_counter().incr(&bucket)
        }
    };

    if count > key.rate_limit {
        return Error::RateLimit("Rate limit exceeded".to_string()).into_response();
    }

    next.run(req).await
}
