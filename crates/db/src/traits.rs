//! Store contracts, one trait per entity.
//!
//! All operations are safe under concurrent callers; writes are atomic per
//! record. Secondary lookups (user by API key or email, organization by
//! name, membership by pair or by user) are part of the contract so that
//! backends can index them natively.

use async_trait::async_trait;

use bifrost_domain::{Membership, Organization, RootKey, Service, User, VirtualKey};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. `AlreadyExists` if the id, email, or API key is
    /// already taken.
    async fn create(&self, user: User) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<User>;
    async fn get_by_api_key(&self, api_key: &str) -> StoreResult<User>;
    async fn get_by_email(&self, email: &str) -> StoreResult<User>;
    async fn update(&self, user: User) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Insert a new organization. `AlreadyExists` if the id or name is
    /// already taken.
    async fn create(&self, org: Organization) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<Organization>;
    async fn get_by_name(&self, name: &str) -> StoreResult<Organization>;
    async fn update(&self, org: Organization) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Organization>>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert a new membership. The `(user_id, org_id)` pair is the primary
    /// key; one role per user per organization.
    async fn create(&self, membership: Membership) -> StoreResult<()>;
    async fn get(&self, user_id: &str, org_id: &str) -> StoreResult<Membership>;
    async fn update(&self, membership: Membership) -> StoreResult<()>;
    async fn delete(&self, user_id: &str, org_id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Membership>>;
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Membership>>;
}

#[async_trait]
pub trait VirtualKeyStore: Send + Sync {
    async fn create(&self, key: VirtualKey) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<VirtualKey>;
    async fn update(&self, key: VirtualKey) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<VirtualKey>>;
}

#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn create(&self, service: Service) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<Service>;
    async fn update(&self, service: Service) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<Service>>;
}

#[async_trait]
pub trait RootKeyStore: Send + Sync {
    async fn create(&self, key: RootKey) -> StoreResult<()>;
    async fn get(&self, id: &str) -> StoreResult<RootKey>;
    async fn update(&self, key: RootKey) -> StoreResult<()>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    async fn list(&self) -> StoreResult<Vec<RootKey>>;
}
