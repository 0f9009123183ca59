//! API key token format
//!
//! A token is the configured prefix followed by the URL-safe base64 form of
//! the sealed payload. The store only ever sees the token's SHA-256 digest.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};

/// Default prefix for issued tokens
pub const DEFAULT_KEY_PREFIX: &str = "vk_";

/// Converts sealed bytes to and from their token string
#[derive(Debug, Clone)]
pub struct TokenFormat {
    prefix: String,
}

impl TokenFormat {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Render sealed bytes as a token
    pub fn encode(&self, sealed: &[u8]) -> String {
        format!("{}{}", self.prefix, URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Recover the sealed bytes from a token
    ///
    /// Returns `None` when the prefix is missing or the body is not base64.
    pub fn decode(&self, token: &str) -> Option<Vec<u8>> {
        let body = token.trim().strip_prefix(self.prefix.as_str())?;
        URL_SAFE_NO_PAD.decode(body).ok()
    }

    /// Digest used to find the stored row for a token
    pub fn digest(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.trim().as_bytes());
        format!("sha256${}", URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }
}

impl Default for TokenFormat {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
