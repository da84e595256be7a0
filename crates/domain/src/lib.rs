//! Domain entities for the Bifrost gateway.

pub mod entities;
pub mod role;
pub mod scope;

pub use entities::{Membership, Organization, RootKey, Service, User, VirtualKey};
pub use role::Role;
pub use scope::Scope;
