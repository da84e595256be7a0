//! Shared fixtures for the end-to-end suite.
//!
//! Every test builds a fresh in-memory gateway; upstream backends are real
//! axum servers bound to an ephemeral port so the proxy path is exercised
//! over actual sockets.

use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};

use bifrost_api::{router, Gateway};
use bifrost_auth::{AuthToken, SigningKey, TokenCodec};
use bifrost_db::{RootKeyStore, ServiceStore, UserStore, VirtualKeyStore};
use bifrost_domain::{RootKey, Scope, Service, User, VirtualKey};

pub struct TestGateway {
    pub gateway: Gateway,
    pub server: TestServer,
    pub codec: TokenCodec,
}

impl TestGateway {
    /// Fresh gateway over memory stores and an in-process shared counter.
    pub fn new() -> Self {
        let codec = TokenCodec::new(SigningKey::generate());
        let gateway = Gateway::in_memory(codec.clone());
        let server = TestServer::new(router(gateway.clone())).expect("test server");
        Self {
            gateway,
            server,
            codec,
        }
    }

    /// Seed a user and return it together with a one-hour bearer token
    /// carrying no organization.
    pub async fn seed_user(&self, id: &str, api_key: &str) -> (User, String) {
        let user = User {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            api_key: api_key.to_string(),
        };
        self.gateway
            .users()
            .create(user.clone())
            .await
            .expect("seed user");
        let token = self.token_for(id, "");
        (user, token)
    }

    /// Sign a one-hour token for `user_id` scoped to `org_id` (empty for
    /// none).
    pub fn token_for(&self, user_id: &str, org_id: &str) -> String {
        self.codec
            .sign(&AuthToken {
                user_id: user_id.to_string(),
                org_id: org_id.to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .expect("sign token")
    }

    /// Seed root key `rk` (credential `real`), service `svc` pointed at
    /// `endpoint`, and a virtual key with the given scope/limit/expiry.
    pub async fn seed_proxy_stack(
        &self,
        endpoint: &str,
        scope: Scope,
        rate_limit: i64,
        expires_at: DateTime<Utc>,
    ) -> VirtualKey {
        self.gateway
            .root_keys()
            .create(RootKey {
                id: "rk".to_string(),
                api_key: "real".to_string(),
            })
            .await
            .expect("seed root key");
        self.gateway
            .services()
            .create(Service {
                id: "svc".to_string(),
                endpoint: endpoint.to_string(),
                root_key_id: "rk".to_string(),
            })
            .await
            .expect("seed service");
        let key = VirtualKey {
            id: "vk".to_string(),
            scope,
            expires_at,
            target: "svc".to_string(),
            rate_limit,
        };
        self.gateway
            .keys()
            .create(key.clone())
            .await
            .expect("seed virtual key");
        key
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream listener");
    let addr = listener.local_addr().expect("upstream local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve upstream");
    });
    format!("http://{addr}")
}
