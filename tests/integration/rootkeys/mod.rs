//! Root-key CRUD and redaction behavior.

use axum::http::StatusCode;
use serde_json::{json, Value};

use bifrost_db::RootKeyStore;

use crate::common::TestGateway;

async fn fixture() -> (TestGateway, String, String) {
    let t = TestGateway::new();
    let (user, token) = t.seed_user("u1", "secret").await;
    (t, user.api_key, token)
}

#[tokio::test]
async fn create_returns_the_full_record_once() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "id": "rk1", "api_key": "upstream-secret" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    // Creation is the only response allowed to carry the key material.
    let body = response.json::<Value>();
    assert_eq!(body["id"], "rk1");
    assert_eq!(body["api_key"], "upstream-secret");
}

#[tokio::test]
async fn duplicate_id_conflicts() {
    let (t, api_key, token) = fixture().await;
    let payload = json!({ "id": "rk1", "api_key": "secret" });

    t.server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await
        .assert_status(StatusCode::CREATED);

    let second = t
        .server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);
    assert_eq!(second.text(), "root key already exists");
}

#[tokio::test]
async fn update_rotates_without_echoing_the_key() {
    let (t, api_key, token) = fixture().await;
    t.server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "id": "rk1", "api_key": "old" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = t
        .server
        .put("/v1/rootkeys/rk1")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "api_key": "rotated" }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["id"], "rk1");
    assert!(body.get("api_key").is_none());

    // The store holds the rotated credential.
    assert_eq!(t.gateway.root_keys().get("rk1").await.unwrap().api_key, "rotated");
}

#[tokio::test]
async fn update_rejects_mismatched_ids() {
    let (t, api_key, token) = fixture().await;
    t.server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "id": "rk1", "api_key": "old" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = t
        .server
        .put("/v1/rootkeys/rk1")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "id": "other", "api_key": "x" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "id mismatch");
}

#[tokio::test]
async fn update_of_missing_key_is_not_found() {
    let (t, api_key, token) = fixture().await;

    let response = t
        .server
        .put("/v1/rootkeys/ghost")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "api_key": "x" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_key() {
    let (t, api_key, token) = fixture().await;
    t.server
        .post("/v1/rootkeys")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&json!({ "id": "rk1", "api_key": "secret" }))
        .await
        .assert_status(StatusCode::CREATED);

    let deleted = t
        .server
        .delete("/v1/rootkeys/rk1")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    let again = t
        .server
        .delete("/v1/rootkeys/rk1")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}
