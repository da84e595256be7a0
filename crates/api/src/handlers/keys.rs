//! Virtual-key CRUD handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use bifrost_common::{Error, Result};
use bifrost_db::{ServiceStore, VirtualKeyStore};
use bifrost_domain::{Scope, VirtualKey};

use crate::state::Gateway;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CreateKeyRequest {
    pub id: String,
    pub scope: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub target: String,
    pub rate_limit: i64,
}

/// POST /v1/keys: validate and store a new virtual key.
pub async fn create_key(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<(StatusCode, Json<VirtualKey>)> {
    let req: CreateKeyRequest = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("invalid request".to_string()))?;

    if req.id.is_empty() {
        return Err(Error::Validation("invalid request".to_string()));
    }

    let scope =
        Scope::parse(&req.scope).ok_or_else(|| Error::Validation("invalid scope".to_string()))?;

    let now = Utc::now();
    let key = VirtualKey {
        id: req.id,
        scope,
        // A missing expiry behaves like one already in the past.
        expires_at: req.expires_at.unwrap_or(now),
        target: req.target,
        rate_limit: req.rate_limit,
    };
    key.validate(now)?;

    gateway.services().get(&key.target).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("service not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    gateway.keys().create(key.clone()).await.map_err(|err| {
        if err.is_already_exists() {
            Error::Conflict("key already exists".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(key_id = %key.id, "created key");
    Ok((StatusCode::CREATED, Json(key)))
}

/// DELETE /v1/keys/{id}
pub async fn delete_key(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    gateway.keys().delete(&id).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(key_id = %id, "deleted key");
    Ok(StatusCode::NO_CONTENT)
}
