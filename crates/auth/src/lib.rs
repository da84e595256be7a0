//! Authentication primitives for Bifrost: the compact signed bearer token,
//! its process-wide signing key, and the per-request requester context.

pub mod context;
pub mod error;
pub mod signing;
pub mod token;

pub use context::RequesterContext;
pub use error::AuthError;
pub use signing::SigningKey;
pub use token::{AuthToken, TokenCodec};
