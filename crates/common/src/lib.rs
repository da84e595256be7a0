//! Shared utilities for the Bifrost gateway: configuration, the common
//! error type, and id/API-key generation.

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, DbBackend};
pub use error::{Error, Result};
pub use id::{generate_api_key, generate_id};
