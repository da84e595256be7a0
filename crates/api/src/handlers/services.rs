//! Service CRUD handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use url::Url;

use bifrost_common::{Error, Result};
use bifrost_db::{RootKeyStore, ServiceStore};
use bifrost_domain::Service;

use crate::state::Gateway;

/// The endpoint must be an absolute http(s) URL; anything else would only
/// fail later, mid-proxy, as a 500.
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed =
        Url::parse(endpoint).map_err(|_| Error::Validation("invalid endpoint".to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::Validation("invalid endpoint".to_string()));
    }
    Ok(())
}

/// POST /v1/services
pub async fn create_service(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<(StatusCode, Json<Service>)> {
    let service: Service = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("invalid request".to_string()))?;

    validate_endpoint(&service.endpoint)?;

    gateway
        .root_keys()
        .get(&service.root_key_id)
        .await
        .map_err(|err| {
            if err.is_not_found() {
                Error::NotFound("root key not found".to_string())
            } else {
                Error::Internal("internal error".to_string())
            }
        })?;

    gateway.services().create(service.clone()).await.map_err(|err| {
        if err.is_already_exists() {
            Error::Conflict("service already exists".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(service_id = %service.id, "created service");
    Ok((StatusCode::CREATED, Json(service)))
}

/// DELETE /v1/services/{id}
pub async fn delete_service(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    gateway.services().delete(&id).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    tracing::info!(service_id = %id, "deleted service");
    Ok(StatusCode::NO_CONTENT)
}
