//! The gateway aggregate.
//!
//! Every request-plane collaborator (entity stores, token codec, counter
//! stores, upstream HTTP client) is a constructor parameter, built once at
//! startup. Middleware and handlers close over a clone of this aggregate;
//! nothing reads the environment during request handling. Tests build a
//! fresh aggregate per case.

use std::sync::Arc;

use bifrost_auth::TokenCodec;
use bifrost_db::memory::{
    MemoryMembershipStore, MemoryOrganizationStore, MemoryRootKeyStore, MemoryServiceStore,
    MemoryUserStore, MemoryVirtualKeyStore,
};
use bifrost_db::{
    CounterStore, LocalCounter, MembershipStore, MemoryCounter, OrganizationStore, RootKeyStore,
    ServiceStore, UserStore, VirtualKeyStore,
};

use crate::metrics::Metrics;

struct Inner {
    users: Arc<dyn UserStore>,
    orgs: Arc<dyn OrganizationStore>,
    memberships: Arc<dyn MembershipStore>,
    keys: Arc<dyn VirtualKeyStore>,
    services: Arc<dyn ServiceStore>,
    root_keys: Arc<dyn RootKeyStore>,
    tokens: TokenCodec,
    shared_counter: Arc<dyn CounterStore>,
    local_counter: LocalCounter,
    upstream: reqwest::Client,
    bypass_key: Option<String>,
    metrics: Option<Arc<Metrics>>,
}

/// Shared state of one gateway instance. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

impl Gateway {
    pub fn builder(tokens: TokenCodec) -> GatewayBuilder {
        GatewayBuilder::new(tokens)
    }

    /// A fully in-memory gateway: memory stores and an in-process counter.
    /// This is what `BIFROST_DB=` (empty) serves, and what tests build.
    pub fn in_memory(tokens: TokenCodec) -> Self {
        GatewayBuilder::new(tokens).build()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    pub fn orgs(&self) -> &dyn OrganizationStore {
        self.inner.orgs.as_ref()
    }

    pub fn memberships(&self) -> &dyn MembershipStore {
        self.inner.memberships.as_ref()
    }

    pub fn keys(&self) -> &dyn VirtualKeyStore {
        self.inner.keys.as_ref()
    }

    pub fn services(&self) -> &dyn ServiceStore {
        self.inner.services.as_ref()
    }

    pub fn root_keys(&self) -> &dyn RootKeyStore {
        self.inner.root_keys.as_ref()
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.inner.tokens
    }

    pub fn shared_counter(&self) -> &dyn CounterStore {
        self.inner.shared_counter.as_ref()
    }

    pub fn local_counter(&self) -> &LocalCounter {
        &self.inner.local_counter
    }

    pub fn upstream(&self) -> &reqwest::Client {
        &self.inner.upstream
    }

    /// `Some(static_key)` when `--insecure-dev` bypass is active. An empty
    /// static key admits any request.
    pub fn bypass_key(&self) -> Option<&str> {
        self.inner.bypass_key.as_deref()
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.inner.metrics.as_ref()
    }
}

/// Assembles a [`Gateway`]. Defaults to the in-memory backend for every
/// collaborator; production wiring swaps in Postgres stores and the Redis
/// counter.
pub struct GatewayBuilder {
    users: Arc<dyn UserStore>,
    orgs: Arc<dyn OrganizationStore>,
    memberships: Arc<dyn MembershipStore>,
    keys: Arc<dyn VirtualKeyStore>,
    services: Arc<dyn ServiceStore>,
    root_keys: Arc<dyn RootKeyStore>,
    tokens: TokenCodec,
    shared_counter: Arc<dyn CounterStore>,
    upstream: Option<reqwest::Client>,
    bypass_key: Option<String>,
    metrics: Option<Arc<Metrics>>,
}

impl GatewayBuilder {
    pub fn new(tokens: TokenCodec) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            orgs: Arc::new(MemoryOrganizationStore::new()),
            memberships: Arc::new(MemoryMembershipStore::new()),
            keys: Arc::new(MemoryVirtualKeyStore::new()),
            services: Arc::new(MemoryServiceStore::new()),
            root_keys: Arc::new(MemoryRootKeyStore::new()),
            tokens,
            shared_counter: Arc::new(MemoryCounter::new()),
            upstream: None,
            bypass_key: None,
            metrics: None,
        }
    }

    pub fn users(mut self, store: Arc<dyn UserStore>) -> Self {
        self.users = store;
        self
    }

    pub fn orgs(mut self, store: Arc<dyn OrganizationStore>) -> Self {
        self.orgs = store;
        self
    }

    pub fn memberships(mut self, store: Arc<dyn MembershipStore>) -> Self {
        self.memberships = store;
        self
    }

    pub fn keys(mut self, store: Arc<dyn VirtualKeyStore>) -> Self {
        self.keys = store;
        self
    }

    pub fn services(mut self, store: Arc<dyn ServiceStore>) -> Self {
        self.services = store;
        self
    }

    pub fn root_keys(mut self, store: Arc<dyn RootKeyStore>) -> Self {
        self.root_keys = store;
        self
    }

    pub fn shared_counter(mut self, counter: Arc<dyn CounterStore>) -> Self {
        self.shared_counter = counter;
        self
    }

    pub fn upstream(mut self, client: reqwest::Client) -> Self {
        self.upstream = Some(client);
        self
    }

    /// Enable authentication bypass with the given static key. Callers are
    /// expected to log loudly before flipping this on.
    pub fn bypass_key(mut self, key: String) -> Self {
        self.bypass_key = Some(key);
        self
    }

    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Gateway {
        Gateway {
            inner: Arc::new(Inner {
                users: self.users,
                orgs: self.orgs,
                memberships: self.memberships,
                keys: self.keys,
                services: self.services,
                root_keys: self.root_keys,
                tokens: self.tokens,
                shared_counter: self.shared_counter,
                local_counter: LocalCounter::new(),
                upstream: self.upstream.unwrap_or_default(),
                bypass_key: self.bypass_key,
                metrics: self.metrics,
            }),
        }
    }
}
