//! In-memory user store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bifrost_domain::User;

use crate::error::StoreError;
use crate::traits::{StoreResult, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    by_api_key: HashMap<String, String>,
    by_email: HashMap<String, String>,
}

/// Users in memory with api-key and email indexes.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: User) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        if inner.users.contains_key(&user.id)
            || inner.by_email.contains_key(&user.email)
            || inner.by_api_key.contains_key(&user.api_key)
        {
            return Err(StoreError::AlreadyExists);
        }
        inner.by_api_key.insert(user.api_key.clone(), user.id.clone());
        inner.by_email.insert(user.email.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner.users.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_api_key(&self, api_key: &str) -> StoreResult<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner
            .by_api_key
            .get(api_key)
            .and_then(|id| inner.users.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.read().expect("user store lock poisoned");
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: User) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        let old = inner.users.get(&user.id).cloned().ok_or(StoreError::NotFound)?;
        inner.by_api_key.remove(&old.api_key);
        inner.by_email.remove(&old.email);
        inner.by_api_key.insert(user.api_key.clone(), user.id.clone());
        inner.by_email.insert(user.email.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("user store lock poisoned");
        let user = inner.users.remove(id).ok_or(StoreError::NotFound)?;
        inner.by_api_key.remove(&user.api_key);
        inner.by_email.remove(&user.email);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().expect("user store lock poisoned");
        Ok(inner.users.values().cloned().collect())
    }
}
