//! Rate-limit decision path over the shared (in-process) counter store,
//! plus the local fallback taken when the shared store is down.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::any;
use axum::Router;
use chrono::{Duration, Utc};
use futures::future::join_all;

use bifrost_api::{router, Gateway};
use bifrost_auth::{SigningKey, TokenCodec};
use bifrost_db::counter::CounterError;
use bifrost_db::{CounterStore, VirtualKeyStore};
use bifrost_domain::Scope;

use crate::common::{spawn_upstream, TestGateway};

async fn fixture(rate_limit: i64) -> (TestGateway, String, String) {
    let t = TestGateway::new();
    let (user, token) = t.seed_user("u1", "secret").await;
    let endpoint = spawn_upstream(Router::new().route("/test", any(|| async { "ok" }))).await;
    t.seed_proxy_stack(&endpoint, Scope::Read, rate_limit, Utc::now() + Duration::hours(1))
        .await;
    (t, user.api_key, token)
}

#[tokio::test]
async fn second_request_in_same_minute_is_limited() {
    let (t, api_key, token) = fixture(1).await;

    let first = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    first.assert_status_ok();

    let second = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.text(), "Rate limit exceeded");
}

#[tokio::test]
async fn concurrent_requests_are_bounded_by_the_limit() {
    let limit = 2;
    let total = 6;
    let (t, api_key, token) = fixture(limit).await;

    let responses = join_all((0..total).map(|_| {
        let request = t
            .server
            .get("/v1/proxy/test")
            .add_header("X-Virtual-Key", "vk")
            .add_header("X-API-Key", api_key.clone())
            .add_header("Authorization", format!("Bearer {token}"));
        async move { request.await }
    }))
    .await;

    let ok = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::OK)
        .count();
    let limited = responses
        .iter()
        .filter(|r| r.status_code() == StatusCode::TOO_MANY_REQUESTS)
        .count();

    assert!(ok <= limit as usize, "{ok} successes exceed the limit");
    assert!(
        limited >= total - limit as usize,
        "only {limited} requests were limited"
    );
    assert_eq!(ok + limited, total);
}

#[tokio::test]
async fn requests_without_a_key_bypass_the_limiter() {
    let (t, api_key, token) = fixture(1).await;

    // No virtual key: the limiter passes through and the proxy engine
    // rejects with its own error, never 429, no matter how often.
    for _ in 0..3 {
        let response = t
            .server
            .get("/v1/proxy/test")
            .add_header("X-API-Key", api_key.clone())
            .add_header("Authorization", format!("Bearer {token}"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "missing key");
    }
}

#[tokio::test]
async fn unknown_keys_bypass_the_limiter() {
    let (t, api_key, token) = fixture(1).await;

    for _ in 0..3 {
        let response = t
            .server
            .get("/v1/proxy/test")
            .add_header("X-Virtual-Key", "ghost")
            .add_header("X-API-Key", api_key.clone())
            .add_header("Authorization", format!("Bearer {token}"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.text(), "invalid key");
    }
}

/// Shared store that is permanently unreachable.
struct DownCounter;

#[async_trait]
impl CounterStore for DownCounter {
    async fn incr(&self, _bucket: &str) -> Result<i64, CounterError> {
        Err(CounterError::unavailable("connection refused"))
    }

    async fn expire(&self, _bucket: &str, _ttl: StdDuration) -> Result<(), CounterError> {
        Err(CounterError::unavailable("connection refused"))
    }
}

#[tokio::test]
async fn shared_store_outage_falls_back_to_local_counting() {
    let codec = TokenCodec::new(SigningKey::generate());
    let gateway = Gateway::builder(codec.clone())
        .shared_counter(Arc::new(DownCounter))
        .build();
    let server = axum_test::TestServer::new(router(gateway.clone())).unwrap();

    let t = TestGateway {
        gateway,
        server,
        codec,
    };
    let (user, token) = t.seed_user("u1", "secret").await;
    let endpoint = spawn_upstream(Router::new().route("/test", any(|| async { "ok" }))).await;
    t.seed_proxy_stack(&endpoint, Scope::Read, 1, Utc::now() + Duration::hours(1))
        .await;

    // The outage is absorbed: the first request succeeds on the local
    // counter and the second still hits the limit.
    let first = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk")
        .add_header("X-API-Key", user.api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    first.assert_status_ok();

    let second = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk")
        .add_header("X-API-Key", user.api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn distinct_keys_have_independent_budgets() {
    let (t, api_key, token) = fixture(1).await;
    t.gateway
        .keys()
        .create(bifrost_domain::VirtualKey {
            id: "vk2".to_string(),
            scope: Scope::Read,
            expires_at: Utc::now() + Duration::hours(1),
            target: "svc".to_string(),
            rate_limit: 1,
        })
        .await
        .unwrap();

    let first = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk")
        .add_header("X-API-Key", api_key.clone())
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    first.assert_status_ok();

    // vk is exhausted, vk2 still has budget.
    let other = t
        .server
        .get("/v1/proxy/test")
        .add_header("X-Virtual-Key", "vk2")
        .add_header("X-API-Key", api_key)
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    other.assert_status_ok();
}
