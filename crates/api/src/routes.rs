//! Route composition.
//!
//! Protected routes run the fixed middleware order: authenticator, then
//! org-context resolver, then (proxy only) the rate limiter. User routes
//! authenticate with the bearer token alone. Liveness, version, and
//! metrics are public. Routes carry their full paths (no nesting) so the
//! proxy engine sees the unmodified request URI.

use axum::{
    middleware::from_fn_with_state,
    routing::{any, delete, get, post, put},
    Router,
};

use crate::handlers::{keys, meta, proxy, rootkeys, services, users};
use crate::middleware::{enforce_rate_limit, require_api_key, resolve_org_context, track};
use crate::state::Gateway;

/// Build the full gateway router over one aggregate.
pub fn router(gateway: Gateway) -> Router {
    let proxied = Router::new()
        .route("/v1/proxy", any(proxy::forward))
        .route("/v1/proxy/{*tail}", any(proxy::forward))
        .layer(from_fn_with_state(gateway.clone(), enforce_rate_limit));

    // API-key + bearer-token routes. Layer order is inside-out: the
    // authenticator added last runs first.
    let keyed = Router::new()
        .route("/v1/hello", get(meta::hello))
        .route("/v1/keys", post(keys::create_key))
        .route("/v1/keys/{id}", delete(keys::delete_key))
        .route("/v1/rootkeys", post(rootkeys::create_root_key))
        .route(
            "/v1/rootkeys/{id}",
            put(rootkeys::update_root_key).delete(rootkeys::delete_root_key),
        )
        .route("/v1/services", post(services::create_service))
        .route("/v1/services/{id}", delete(services::delete_service))
        .merge(proxied)
        .layer(from_fn_with_state(gateway.clone(), resolve_org_context))
        .layer(from_fn_with_state(gateway.clone(), require_api_key));

    // Bearer-token-only routes.
    let token_only = Router::new()
        .route("/v1/users", post(users::create_user))
        .route("/v1/user", get(users::current_user))
        .layer(from_fn_with_state(gateway.clone(), resolve_org_context));

    let mut app = Router::new()
        .route("/healthz", get(meta::healthz))
        .route("/version", get(meta::version))
        .merge(keyed)
        .merge(token_only);

    if gateway.metrics().is_some() {
        app = app.route("/metrics", get(meta::metrics));
    }

    app.layer(from_fn_with_state(gateway.clone(), track))
        .with_state(gateway)
}
