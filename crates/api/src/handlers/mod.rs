//! HTTP handlers for the gateway surface.

pub mod keys;
pub mod meta;
pub mod proxy;
pub mod rootkeys;
pub mod services;
pub mod users;
