//! In-memory root-key store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::RootKey;

use crate::error::StoreError;
use crate::traits::{RootKeyStore, StoreResult};

/// Long-lived upstream credentials in memory.
#[derive(Default)]
pub struct MemoryRootKeyStore {
    inner: RwLock<HashMap<String, RootKey>>,
}

impl MemoryRootKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RootKeyStore for MemoryRootKeyStore {
    async fn create(&self, key: RootKey) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("root key store lock poisoned");
        if inner.contains_key(&key.id) {
            return Err(StoreError::AlreadyExists);
        }
        inner.insert(key.id.clone(), key);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<RootKey> {
        let inner = self.inner.read().expect("root key store lock poisoned");
        inner.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: RootKey) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("root key store lock poisoned");
        if !inner.contains_key(&key.id) {
            return Err(StoreError::NotFound);
        }
        inner.insert(key.id.clone(), key);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("root key store lock poisoned");
        inner.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<RootKey>> {
        let inner = self.inner.read().expect("root key store lock poisoned");
        Ok(inner.values().cloned().collect())
    }
}
