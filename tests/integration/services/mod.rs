//! Service registration.

use axum::http::StatusCode;
use serde_json::{json, Value};

use bifrost_domain::RootKey;

use crate::common::TestGateway;

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
    (t, user.api_key, token)
}

#[tokio::test]
async fn create_and_delete_round_trip() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .post("/v1/services")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({
            "id": "svc",
            "endpoint": "http://backend.internal:8080",
            "root_key_id": "rk",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["id"], "svc");

    let deleted = t
        .server
        .delete("/v1/services/svc")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let again = t
        .server
        .delete("/v1/services/svc")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(again.text(), "not found");
}

#[tokio::test]
async fn unknown_root_key_is_not_found() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .post("/v1/services")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({
            "id": "svc",
            "endpoint": "http://backend.internal",
            "root_key_id": "ghost",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "root key not found");
}

#[tokio::test]
async fn relative_endpoint_is_rejected() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .post("/v1/services")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({
            "id": "svc",
            "endpoint": "not-a-url",
            "root_key_id": "rk",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "invalid endpoint");
}

#[tokio::test]
async fn duplicate_id_conflicts() {
    let (t, api_key, token) = fixture().await;
    let payload = json!({
        "id": "svc",
        "endpoint": "http://backend.internal",
        "root_key_id": "rk",
    });

    t.server
        .post("/v1/services")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);

    let second = t
        .server
        .post("/v1/services")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    assert_eq!(second.text(), "service already exists");
}
