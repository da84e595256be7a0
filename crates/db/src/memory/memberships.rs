//! In-memory membership store, keyed by the `(user_id, org_id)` pair.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::Membership;

use crate::error::StoreError;
use crate::traits::{MembershipStore, StoreResult};

fn pair_key(user_id: &str, org_id: &str) -> String {
    format!("{user_id}:{org_id}")
}

/// Memberships in memory with concurrency safety.
#[derive(Default)]
pub struct MemoryMembershipStore {
    inner: RwLock<HashMap<String, Membership>>,
}

impl MemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for MemoryMembershipStore {
    async fn create(&self, membership: Membership) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("membership store lock poisoned");
        let key = pair_key(&membership.user_id, &membership.org_id);
        if inner.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        inner.insert(key, membership);
        Ok(())
    }

    async fn get(&self, user_id: &str, org_id: &str) -> StoreResult<Membership> {
        let inner = self.inner.read().expect("membership store lock poisoned");
        inner
            .get(&pair_key(user_id, org_id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, membership: Membership) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("membership store lock poisoned");
        let key = pair_key(&membership.user_id, &membership.org_id);
        if !inner.contains_key(&key) {
            return Err(StoreError::NotFound);
        }
        inner.insert(key, membership);
        Ok(())
    }

    async fn delete(&self, user_id: &str, org_id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("membership store lock poisoned");
        inner
            .remove(&pair_key(user_id, org_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Membership>> {
        let inner = self.inner.read().expect("membership store lock poisoned");
        Ok(inner.values().cloned().collect())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Membership>> {
        let inner = self.inner.read().expect("membership store lock poisoned");
        Ok(inner
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}
