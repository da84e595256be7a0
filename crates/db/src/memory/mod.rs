//! In-memory store backend.
//!
//! Each store is a map keyed by primary id plus whatever secondary indexes
//! its contract needs, behind a coarse reader/writer lock. Index updates
//! happen under the same lock as the primary record, so readers never
//! observe a half-applied write. Nothing here suspends.

mod keys;
mod memberships;
mod orgs;
mod rootkeys;
mod services;
mod users;

pub use keys::MemoryVirtualKeyStore;
pub use memberships::MemoryMembershipStore;
pub use orgs::MemoryOrganizationStore;
pub use rootkeys::MemoryRootKeyStore;
pub use services::MemoryServiceStore;
pub use users::MemoryUserStore;
