//! In-memory virtual-key store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::VirtualKey;

use crate::error::StoreError;
use crate::traits::{StoreResult, VirtualKeyStore};

/// Virtual keys in memory with concurrency safety.
#[derive(Default)]
pub struct MemoryVirtualKeyStore {
    inner: RwLock<HashMap<String, VirtualKey>>,
}

impl MemoryVirtualKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VirtualKeyStore for MemoryVirtualKeyStore {
    async fn create(&self, key: VirtualKey) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("key store lock poisoned");
        if inner.contains_key(&key.id) {
            return Err(StoreError::AlreadyExists);
        }
        inner.insert(key.id.clone(), key);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<VirtualKey> {
        let inner = self.inner.read().expect("key store lock poisoned");
        inner.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: VirtualKey) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("key store lock poisoned");
        if !inner.contains_key(&key.id) {
            return Err(StoreError::NotFound);
        }
        inner.insert(key.id.clone(), key);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("key store lock poisoned");
        inner.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<VirtualKey>> {
        let inner = self.inner.read().expect("key store lock poisoned");
        Ok(inner.values().cloned().collect())
    }
}
