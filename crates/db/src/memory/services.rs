//! In-memory service store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::Service;

use crate::error::StoreError;
use crate::traits::{ServiceStore, StoreResult};

/// Registered upstream services in memory.
#[derive(Default)]
pub struct MemoryServiceStore {
    inner: RwLock<HashMap<String, Service>>,
}

impl MemoryServiceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceStore for MemoryServiceStore {
    async fn create(&self, service: Service) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("service store lock poisoned");
        if inner.contains_key(&service.id) {
            return Err(StoreError::AlreadyExists);
        }
        inner.insert(service.id.clone(), service);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Service> {
        let inner = self.inner.read().expect("service store lock poisoned");
        inner.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, service: Service) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("service store lock poisoned");
        if !inner.contains_key(&service.id) {
            return Err(StoreError::NotFound);
        }
        inner.insert(service.id.clone(), service);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("service store lock poisoned");
        inner.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Service>> {
        let inner = self.inner.read().expect("service store lock poisoned");
        Ok(inner.values().cloned().collect())
    }
}
