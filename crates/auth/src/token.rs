//! Compact signed bearer tokens.
//!
//! Wire form is `base64(payload) + "." + base64(mac)` where the payload is
//! the canonical JSON serialization of [`AuthToken`] and the MAC is
//! HMAC-SHA256 over those payload bytes under the process signing key.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AuthError;
use crate::signing::SigningKey;

type HmacSha256 = Hmac<Sha256>;

/// Payload of a signed bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub org_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies [`AuthToken`]s under a fixed key.
///
/// Built once at startup and shared by the org-context middleware, the user
/// handlers, and the CLI. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
}

impl TokenCodec {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Serializes and signs `token`.
    pub fn sign(&self, token: &AuthToken) -> Result<String, AuthError> {
        let payload = serde_json::to_vec(token).map_err(|_| AuthError::InvalidToken)?;
        let mac = self.mac_over(&payload);
        Ok(format!(
            "{}.{}",
            STANDARD.encode(&payload),
            STANDARD.encode(mac)
        ))
    }

    /// Checks structure, MAC, and expiry, returning the embedded payload.
    ///
    /// MAC comparison is constant-time (`Mac::verify_slice`); a
    /// timing-variant comparison here would leak signature bytes.
    pub fn verify(&self, raw: &str) -> Result<AuthToken, AuthError> {
        let (payload_b64, sig_b64) = match raw.split_once('.') {
            // A second '.' means more than two parts; reject.
            Some((p, s)) if !s.contains('.') => (p, s),
            _ => return Err(AuthError::InvalidToken),
        };

        let payload = STANDARD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let sig = STANDARD
            .decode(sig_b64)
            .map_err(|_| AuthError::InvalidToken)?;

        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|_| AuthError::InvalidToken)?;
        mac.update(&payload);
        mac.verify_slice(&sig).map_err(|_| AuthError::InvalidToken)?;

        let token: AuthToken =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)?;

        if Utc::now() > token.expires_at {
            return Err(AuthError::ExpiredToken);
        }

        Ok(token)
    }

    fn mac_over(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
