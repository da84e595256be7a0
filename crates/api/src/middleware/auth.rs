//! Requester authentication: validates the caller's API key.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use bifrost_common::Error;
use bifrost_db::UserStore;

use crate::state::Gateway;

/// Pull the requester API key out of `X-API-Key` or the `Authorization`
/// header. A `Bearer ` prefix on the latter is stripped when present.
fn extract_api_key(req: &Request) -> String {
    if let Some(key) = req.headers().get("x-api-key").and_then(|v| v.to_str().ok()) {
        if !key.is_empty() {
            return key.to_string();
        }
    }
    match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(auth) => auth.strip_prefix("Bearer ").unwrap_or(auth).to_string(),
        None => String::new(),
    }
}

/// Authenticator middleware: the request proceeds only when the presented
/// API key maps to a known user, or when dev bypass admits it.
pub async fn require_api_key(
    State(gateway): State<Gateway>,
    req: Request,
    next: Next,
) -> Response {
    let key = extract_api_key(&req);
    if key.is_empty() {
        return Error::Authentication("unauthorized".to_string()).into_response();
    }

    // Dev bypass (--insecure-dev only): a match against the static key, or
    // an empty static key, admits the request without consulting the store.
    if let Some(static_key) = gateway.bypass_key() {
        if static_key.is_empty() || key == static_key {
            tracing::debug!("request admitted via insecure-dev bypass");
            return next.run(req).await;
        }
    }

    match gateway.users().get_by_api_key(&key).await {
        Ok(_) => next.run(req).await,
        Err(err) if err.is_not_found() => {
            Error::Authentication("unauthorized".to_string()).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "api key lookup failed");
            Error::Internal("internal error".to_string()).into_response()
        }
    }
}
