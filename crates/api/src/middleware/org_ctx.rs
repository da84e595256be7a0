//! Organization-context resolution: validates the signed bearer token and
//! attaches the requester context to the in-flight request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use bifrost_auth::{AuthError, RequesterContext};
use bifrost_common::Error;
use bifrost_db::MembershipStore;

use crate::state::Gateway;

/// Resolver middleware. On a valid token it looks up the requester's
/// membership in the token's organization; a missing membership leaves the
/// role empty but the request proceeds, since endpoints enforce roles
/// themselves. Handlers downstream read [`RequesterContext`] from request
/// extensions, never from headers.
pub async fn resolve_org_context(
    State(gateway): State<Gateway>,
    mut req: Request,
    next: Next,
) -> Response {
    let raw = match req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        Some(token) => token.to_string(),
        None => return AuthError::MissingCredentials.into_response(),
    };

    let token = match gateway.tokens().verify(&raw) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    let mut ctx = RequesterContext::new(token.user_id, token.org_id);
    if !ctx.org_id.is_empty() {
        if let Ok(membership) = gateway.memberships().get(&ctx.user_id, &ctx.org_id).await {
            ctx.role = Some(membership.role.to_string());
        }
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

/// Extractor for the context attached by [`resolve_org_context`].
#[derive(Debug, Clone)]
pub struct Requester(pub RequesterContext);

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequesterContext>()
            .cloned()
            .map(Requester)
            // Only reachable when a route forgot the resolver middleware.
            .ok_or_else(|| Error::Internal("internal error".to_string()))
    }
}
