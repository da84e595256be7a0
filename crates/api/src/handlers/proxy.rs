//! The proxy engine: `ANY /v1/proxy/{tail}`.
//!
//! A linear state machine over the in-flight request: extract and require
//! the virtual key, strip it, load key/service/root key, enforce expiry and
//! scope, rewrite the path, substitute the upstream credential, and stream
//! the request to the upstream. The upstream's status and body are
//! surfaced unchanged. Bodies are streamed in both directions.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use url::Url;

use bifrost_common::Error;
use bifrost_db::{RootKeyStore, ServiceStore, VirtualKeyStore};

use crate::state::Gateway;

const PROXY_PREFIX: &str = "/v1/proxy";

/// Hop-by-hop headers are connection-scoped and must not be forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Join an endpoint base path with the rewritten request path using a
/// single slash.
fn join_paths(base: &str, tail: &str) -> String {
    match (base.ends_with('/'), tail.starts_with('/')) {
        (true, true) => format!("{}{}", base, &tail[1..]),
        (false, false) => format!("{base}/{tail}"),
        _ => format!("{base}{tail}"),
    }
}

/// Strip the proxy mount prefix; an empty remainder maps to "/".
fn rewrite_path(path: &str) -> &str {
    let tail = path.strip_prefix(PROXY_PREFIX).unwrap_or(path);
    if tail.is_empty() {
        "/"
    } else {
        tail
    }
}

/// Query string minus the `key` routing parameter.
fn remaining_query(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .filter(|(k, _)| k != "key")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

/// Forward the request to the upstream selected by the presented virtual
/// key.
pub async fn forward(State(gateway): State<Gateway>, req: Request) -> Response {
    // Extract the virtual key from the header, falling back to the `key`
    // query parameter. Neither may reach the upstream.
    let mut key_id = req
        .headers()
        .get("x-virtual-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if key_id.is_empty() {
        if let Some((_, v)) = url::form_urlencoded::parse(
            req.uri().query().unwrap_or_default().as_bytes(),
        )
        .find(|(k, _)| k == "key")
        {
            key_id = v.into_owned();
        }
    }
    if key_id.is_empty() {
        return Error::Authentication("missing key".to_string()).into_response();
    }

    let key = match gateway.keys().get(&key_id).await {
        Ok(key) => key,
        Err(err) if err.is_not_found() => {
            return Error::Authentication("invalid key".to_string()).into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "virtual key lookup failed");
            return Error::Internal("internal error".to_string()).into_response();
        }
    };

    if key.is_expired(Utc::now()) {
        return Error::Authentication("key expired".to_string()).into_response();
    }

    if let Some(metrics) = gateway.metrics() {
        metrics.key_usage_total.with_label_values(&[&key.id]).inc();
    }

    if !key.scope.allows_method(req.method()) {
        return Error::Authorization("insufficient scope".to_string()).into_response();
    }

    let service = match gateway.services().get(&key.target).await {
        Ok(service) => service,
        Err(err) if err.is_not_found() => {
            return Error::NotFound("service not found".to_string()).into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "service lookup failed");
            return Error::Internal("internal error".to_string()).into_response();
        }
    };

    let root_key = match gateway.root_keys().get(&service.root_key_id).await {
        Ok(root_key) => root_key,
        Err(err) if err.is_not_found() => {
            // An existing service pointing at a missing root key is a broken
            // invariant, not a client error.
            tracing::error!(service_id = %service.id, "service references missing root key");
            return Error::Internal("root key not found".to_string()).into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "root key lookup failed");
            return Error::Internal("internal error".to_string()).into_response();
        }
    };

    let mut target = match Url::parse(&service.endpoint) {
        Ok(url) if url.host_str().is_some() => url,
        _ => {
            tracing::error!(service_id = %service.id, endpoint = %service.endpoint, "unparseable service endpoint");
            return Error::Internal("bad service endpoint".to_string()).into_response();
        }
    };

    let (parts, body) = req.into_parts();

    let path = join_paths(target.path(), rewrite_path(parts.uri.path()));
    target.set_path(&path);
    let query = remaining_query(parts.uri.query());
    if query.is_empty() {
        target.set_query(None);
    } else {
        target.query_pairs_mut().clear().extend_pairs(query);
    }

    // Copy request headers minus the virtual key, hop-by-hop set, and the
    // connection-derived fields the client set for *us*. Host and
    // Content-Length are rewritten for the upstream connection.
    let mut headers = HeaderMap::new();
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
            || name.as_str() == "x-virtual-key"
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    let credential = match HeaderValue::from_str(&root_key.api_key) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!(root_key_id = %root_key.id, "root key is not a valid header value");
            return Error::Internal("internal error".to_string()).into_response();
        }
    };
    headers.insert("x-api-key", credential);

    let upstream_result = gateway
        .upstream()
        .request(parts.method.clone(), target)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .send()
        .await;

    let upstream_response = match upstream_result {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, service_id = %service.id, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "bad gateway").into_response();
        }
    };

    let mut builder = Response::builder().status(upstream_response.status());
    for (name, value) in upstream_response.headers().iter() {
        if is_hop_by_hop(name) {
            continue;
        }
        builder = builder.header(name.clone(), value.clone());
    }
    builder
        .body(Body::from_stream(upstream_response.bytes_stream()))
        .unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to assemble upstream response");
            Error::Internal("internal error".to_string()).into_response()
        })
}
