//! Identifier and credential generation helpers.

use uuid::Uuid;

/// Returns a new UUIDv4 string for entity ids.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns a random hex-encoded API key (128 bits of entropy).
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 16];
    // A zeroed or partial key must never be handed out.
    getrandom::getrandom(&mut bytes).expect("OS random source unavailable");
    hex::encode(bytes)
}
