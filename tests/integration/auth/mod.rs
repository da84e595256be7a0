//! Authenticator and org-context middleware behavior, plus the public
//! liveness endpoints.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::Value;

use bifrost_auth::AuthToken;
use bifrost_db::{MembershipStore, OrganizationStore};
use bifrost_domain::{Membership, Organization, Role};

use crate::common::TestGateway;

#[tokio::test]
async fn healthz_is_public() {
    let t = TestGateway::new();
    let response = t.server.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn version_is_public_json() {
    let t = TestGateway::new();
    let response = t.server.get("/version").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn hello_requires_api_key() {
    let t = TestGateway::new();
    let response = t.server.get("/v1/hello").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.text(), "unauthorized");
}

#[tokio::test]
async fn hello_rejects_unknown_api_key() {
    let t = TestGateway::new();
    let response = t
        .server
        .get("/v1/hello")
        .add_header("X-API-Key", "nobody")
        .add_header("Authorization", "Bearer whatever")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hello_requires_bearer_token() {
    let t = TestGateway::new();
    let (user, _) = t.seed_user("u1", "secret").await;

    let response = t
        .server
        .get("/v1/hello")
        .add_header("X-API-Key", user.api_key.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hello_rejects_garbage_token() {
    let t = TestGateway::new();
    let (user, _) = t.seed_user("u1", "secret").await;

    let response = t
        .server
        .get("/v1/hello")
        .add_header("X-API-Key", user.api_key.clone())
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hello_rejects_expired_token() {
    let t = TestGateway::new();
    let (user, _) = t.seed_user("u1", "secret").await;

    let stale = t
        .codec
        .sign(&AuthToken {
            user_id: "u1".to_string(),
            org_id: String::new(),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .unwrap();

    let response = t
        .server
        .get("/v1/hello")
        .add_header("X-API-Key", user.api_key.clone())
        .add_header("Authorization", format!("Bearer {stale}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hello_with_valid_credentials() {
    let t = TestGateway::new();
    let (user, token) = t.seed_user("u1", "secret").await;

    let response = t
        .server
        .get("/v1/hello")
        .add_header("X-API-Key", user.api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "hello world");
}

#[tokio::test]
async fn org_context_resolves_membership_role() {
    let t = TestGateway::new();
    let (user, _) = t.seed_user("u1", "secret").await;
    t.gateway
        .orgs()
        .create(Organization {
            id: "o1".to_string(),
            name: "Acme".to_string(),
            domain: String::new(),
            email: String::new(),
        })
        .await
        .unwrap();
    t.gateway
        .memberships()
        .create(Membership {
            user_id: user.id.clone(),
            org_id: "o1".to_string(),
            role: Role::Admin,
        })
        .await
        .unwrap();

    let token = t.token_for("u1", "o1");
    let response = t
        .server
        .get("/v1/user")
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["orgs"][0]["org_id"], "o1");
    assert_eq!(body["orgs"][0]["name"], "Acme");
    assert_eq!(body["orgs"][0]["role"], "admin");
}

#[tokio::test]
async fn metrics_endpoint_reports_request_counts() {
    use std::sync::Arc;

    use bifrost_api::{router, Gateway, Metrics};
    use bifrost_auth::{SigningKey, TokenCodec};

    let gateway = Gateway::builder(TokenCodec::new(SigningKey::generate()))
        .metrics(Arc::new(Metrics::new()))
        .build();
    let server = axum_test::TestServer::new(router(gateway)).unwrap();

    server.get("/healthz").await.assert_status_ok();

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("request_total"));
    assert!(body.contains("/healthz"));
}

#[tokio::test]
async fn metrics_endpoint_absent_when_disabled() {
    let t = TestGateway::new();
    let response = t.server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn org_context_tolerates_missing_membership() {
    let t = TestGateway::new();
    t.seed_user("u1", "secret").await;

    // Token names an org the user is not a member of; the request still
    // proceeds with an empty role.
    let token = t.token_for("u1", "ghost-org");
    let response = t
        .server
        .get("/v1/user")
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body.get("orgs").is_none());
}
