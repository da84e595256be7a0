//! Token signing key lifecycle.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Process-wide HMAC signing key. Immutable after construction and safe to
/// share across request tasks.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Loads the key from an optional base64-encoded configuration value.
    ///
    /// A missing or malformed value is recoverable: a fresh random 32-byte
    /// key is generated and a warning logged. Rotation simply invalidates
    /// previously issued tokens.
    pub fn load(configured: Option<&str>) -> Self {
        match configured {
            Some(encoded) => match STANDARD.decode(encoded) {
                Ok(bytes) if !bytes.is_empty() => SigningKey(bytes),
                _ => {
                    tracing::warn!(
                        "BIFROST_SIGNING_KEY is not valid base64; generated a random signing key"
                    );
                    Self::generate()
                }
            },
            None => {
                tracing::warn!(
                    "BIFROST_SIGNING_KEY is not set; generated a random signing key \
                     (existing tokens will not verify after restart)"
                );
                Self::generate()
            }
        }
    }

    /// Creates a fresh random 32-byte key.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; 32];
        getrandom::getrandom(&mut bytes).expect("OS random source unavailable");
        SigningKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Base64 rendering, e.g. for `init-admin` output or operator docs.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
