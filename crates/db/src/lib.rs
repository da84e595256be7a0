//! Store contracts and backends for Bifrost.
//!
//! Every entity has a store trait with an in-memory implementation (maps
//! behind a reader/writer lock) and a Postgres implementation over `sqlx`.
//! Business logic never branches on the backend; it only sees the traits.
//! This crate also houses the rate-limit counter stores: the shared Redis
//! counter and the process-local fallback.

pub mod counter;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use counter::{CounterStore, LocalCounter, MemoryCounter, RedisCounter};
pub use error::StoreError;
pub use traits::{
    MembershipStore, OrganizationStore, RootKeyStore, ServiceStore, UserStore, VirtualKeyStore,
};
