//! In-memory organization store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::Organization;

use crate::error::StoreError;
use crate::traits::{OrganizationStore, StoreResult};

#[derive(Default)]
struct Inner {
    orgs: HashMap<String, Organization>,
    by_name: HashMap<String, String>,
}

/// Organizations in memory with a unique-name index.
#[derive(Default)]
pub struct MemoryOrganizationStore {
    inner: RwLock<Inner>,
}

impl MemoryOrganizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationStore for MemoryOrganizationStore {
    async fn create(&self, org: Organization) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("org store lock poisoned");
        if inner.orgs.contains_key(&org.id) || inner.by_name.contains_key(&org.name) {
            return Err(StoreError::AlreadyExists);
        }
        inner.by_name.insert(org.name.clone(), org.id.clone());
        inner.orgs.insert(org.id.clone(), org);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Organization> {
        let inner = self.inner.read().expect("org store lock poisoned");
        inner.orgs.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_name(&self, name: &str) -> StoreResult<Organization> {
        let inner = self.inner.read().expect("org store lock poisoned");
        inner
            .by_name
            .get(name)
            .and_then(|id| inner.orgs.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, org: Organization) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("org store lock poisoned");
        let old = inner.orgs.get(&org.id).cloned().ok_or(StoreError::NotFound)?;
        if old.name != org.name && inner.by_name.contains_key(&org.name) {
            return Err(StoreError::AlreadyExists);
        }
        inner.by_name.remove(&old.name);
        inner.by_name.insert(org.name.clone(), org.id.clone());
        inner.orgs.insert(org.id.clone(), org);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("org store lock poisoned");
        let org = inner.orgs.remove(id).ok_or(StoreError::NotFound)?;
        inner.by_name.remove(&org.name);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Organization>> {
        let inner = self.inner.read().expect("org store lock poisoned");
        Ok(inner.orgs.values().cloned().collect())
    }
}
