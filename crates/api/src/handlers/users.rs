//! User management handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use bifrost_auth::AuthToken;
use bifrost_common::{generate_api_key, generate_id, Error, Result};
use bifrost_db::{MembershipStore, OrganizationStore, UserStore};
use bifrost_domain::{Membership, Organization, Role, User};

use crate::middleware::Requester;
use crate::state::Gateway;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub org_id: String,
    pub org_name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// POST /v1/users: create a user, optionally creating or joining an
/// organization, and return a freshly signed 24-hour bearer token.
pub async fn create_user(
    State(gateway): State<Gateway>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateUserResponse>)> {
    let req: CreateUserRequest = serde_json::from_slice(&body)
        .map_err(|_| Error::Validation("invalid request".to_string()))?;

    if req.name.is_empty() || req.email.is_empty() {
        return Err(Error::Validation("invalid request".to_string()));
    }

    let role = if req.role.is_empty() {
        Role::Member
    } else {
        Role::parse(&req.role).ok_or_else(|| Error::Validation("invalid role".to_string()))?
    };

    let user = User::new(generate_id(), req.name, req.email, generate_api_key())?;
    gateway.users().create(user.clone()).await.map_err(|err| {
        if err.is_already_exists() {
            Error::Conflict("user already exists".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    let org_id = if !req.org_name.is_empty() && req.org_id.is_empty() {
        let org = Organization {
            id: generate_id(),
            name: req.org_name,
            domain: String::new(),
            email: String::new(),
        };
        gateway.orgs().create(org.clone()).await.map_err(|err| {
            if err.is_already_exists() {
                Error::Conflict("organization already exists".to_string())
            } else {
                Error::Internal("internal error".to_string())
            }
        })?;
        org.id
    } else if !req.org_id.is_empty() {
        gateway.orgs().get(&req.org_id).await.map_err(|err| {
            if err.is_not_found() {
                Error::NotFound("organization not found".to_string())
            } else {
                Error::Internal("internal error".to_string())
            }
        })?;
        req.org_id
    } else {
        String::new()
    };

    if !org_id.is_empty() {
        let membership = Membership {
            user_id: user.id.clone(),
            org_id: org_id.clone(),
            role,
        };
        gateway
            .memberships()
            .create(membership)
            .await
            .map_err(|err| {
                if err.is_already_exists() {
                    Error::Conflict("membership already exists".to_string())
                } else {
                    Error::Internal("internal error".to_string())
                }
            })?;
    }

    let token = gateway
        .tokens()
        .sign(&AuthToken {
            user_id: user.id.clone(),
            org_id,
            expires_at: Utc::now() + Duration::hours(TOKEN_TTL_HOURS),
        })
        .map_err(|_| Error::Internal("internal error".to_string()))?;

    tracing::info!(user_id = %user.id, "created user");
    Ok((StatusCode::CREATED, Json(CreateUserResponse { user, token })))
}

#[derive(Debug, Serialize)]
pub struct OrgInfo {
    pub org_id: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orgs: Vec<OrgInfo>,
}

/// GET /v1/user: the authenticated user plus its membership triples.
pub async fn current_user(
    State(gateway): State<Gateway>,
    Requester(ctx): Requester,
) -> Result<Json<UserInfoResponse>> {
    let user = gateway.users().get(&ctx.user_id).await.map_err(|err| {
        if err.is_not_found() {
            Error::NotFound("not found".to_string())
        } else {
            Error::Internal("internal error".to_string())
        }
    })?;

    let memberships = gateway
        .memberships()
        .list_by_user(&user.id)
        .await
        .map_err(|_| Error::Internal("internal error".to_string()))?;

    let mut orgs = Vec::with_capacity(memberships.len());
    for membership in memberships {
        if let Ok(org) = gateway.orgs().get(&membership.org_id).await {
            orgs.push(OrgInfo {
                org_id: org.id,
                name: org.name,
                role: membership.role.to_string(),
            });
        }
    }

    Ok(Json(UserInfoResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        orgs,
    }))
}
