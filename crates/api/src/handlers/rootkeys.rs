//! Root-key CRUD handlers.
//!
//! Root keys are upstream credentials: the full record (including the key
//! material) is returned exactly once, on creation. Updates and other
//! responses only ever reference the id.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use bifrost_common::{Error, Result};
use bifrost_db::RootKeyStore;
use bifrost_domain::RootKey;

use crate::state::Gateway;

#[derive(Debug, Serialize)]
pub struct RootKeyRef {
    pub id: String,
}

/// POST /v1/rootkeys
pub async fn create_root_key(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<(StatusCode, Json<RootKey>)> {
    let key: RootKey = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("invalid request".to_string()))?;

    gateway.root_keys().create(key.clone()).await.map_err(|err| {
        if err.is_already_exists() {
            Error::Conflict("root key already exists".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(root_key_id = %key.id, "created root key");
    Ok((StatusCode::CREATED, Json(key)))
}

/// PUT /v1/rootkeys/{id}: replace a stored root key.
pub async fn update_root_key(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<RootKeyRef>> {
    let mut key: RootKey = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("invalid request".to_string()))?;

    // Path id and body id must agree; an absent body id takes the path's.
    if key.id.is_empty() {
        key.id = id;
    } else if key.id != id {
        return Err(Error::Validation("id mismatch".to_string()));
    }

    gateway.root_keys().update(key.clone()).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(root_key_id = %key.id, "updated root key");
    Ok(Json(RootKeyRef { id: key.id }))
}

/// DELETE /v1/rootkeys/{id}
pub async fn delete_root_key(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    gateway.root_keys().delete(&id).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(root_key_id = %id, "deleted root key");
    Ok(StatusCode::NO_CONTENT)
}
