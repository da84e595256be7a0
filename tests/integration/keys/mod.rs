//! Virtual-key creation validation and deletion.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use bifrost_db::{RootKeyStore, ServiceStore, VirtualKeyStore};
use bifrost_domain::{RootKey, Service};

use crate::common::TestGateway;

/// Gateway with a seeded requester, root key `rk`, and service `svc`.
async fn fixture() -> (TestGateway, String, String) {
    let t = TestGateway::new();
    let (user, token) = t.seed_user("u1", "secret").await;
    t.gateway
        .root_keys()
        .create(RootKey {
            id: "rk".to_string(),
            api_key: "real".to_string(),
        })
        .await
        .unwrap();
    t.gateway
        .services()
        .create(Service {
            id: "svc".to_string(),
            endpoint: "http://backend.internal".to_string(),
            root_key_id: "rk".to_string(),
        })
        .await
        .unwrap();
    (t, user.api_key, token)
}

fn valid_payload() -> Value {
    json!({
        "id": "vk1",
        "scope": "read",
        "target": "svc",
        "expires_at": Utc::now() + Duration::hours(1),
        "rate_limit": 10,
    })
}

#[tokio::test]
async fn create_and_fetch_round_trip() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&valid_payload())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["id"], "vk1");
    assert_eq!(body["scope"], "read");
    assert_eq!(body["rate_limit"], 10);

    let stored = t.gateway.keys().get("vk1").await.unwrap();
    assert_eq!(stored.target, "svc");
}

#[tokio::test]
async fn unknown_scope_is_rejected() {
    let (t, api_key, token) = fixture().await;
    let mut payload = valid_payload();
    payload["scope"] = json!("unknown");

    let response = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid scope");
}

#[tokio::test]
async fn past_expiry_is_rejected() {
    let (t, api_key, token) = fixture().await;
    let mut payload = valid_payload();
    payload["expires_at"] = json!(Utc::now() - Duration::hours(1));

    let response = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "expires_at must be in the future");
}

#[tokio::test]
async fn missing_expiry_is_rejected() {
    let (t, api_key, token) = fixture().await;
    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("expires_at");

    let response = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "expires_at must be in the future");
}

#[tokio::test]
async fn non_positive_rate_limit_is_rejected() {
    let (t, api_key, token) = fixture().await;
    for bad in [0, -3] {
        let mut payload = valid_payload();
        payload["rate_limit"] = json!(bad);

        let response = t
            .server
            .post("/v1/keys")
            .add_header("X-API-Key", api_key.clone())
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&payload)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "invalid rate_limit");
    }
}

#[tokio::test]
async fn unknown_target_service_is_not_found() {
    let (t, api_key, token) = fixture().await;
    let mut payload = valid_payload();
    payload["target"] = json!("ghost");

    let response = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "service not found");
}

#[tokio::test]
async fn duplicate_id_conflicts() {
    let (t, api_key, token) = fixture().await;

    let first = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&valid_payload())
        .await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = t
        .server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&valid_payload())
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    assert_eq!(second.text(), "key already exists");
}

#[tokio::test]
async fn delete_removes_the_key() {
    let (t, api_key, token) = fixture().await;
    t.server
        .post("/v1/keys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&valid_payload())
        .await
        .assert_status(StatusCode::CREATED);

    let deleted = t
        .server
        .delete("/v1/keys/vk1")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    assert!(t.gateway.keys().get("vk1").await.is_err());

    let again = t
        .server
        .delete("/v1/keys/vk1")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(again.text(), "not found");
}
