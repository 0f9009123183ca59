//! Process-wide secret key

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;

use super::cipher::CipherError;

/// Length of an AES-256 key in bytes
pub const SECRET_KEY_LEN: usize = 32;

/// The 256-bit secret all API keys are sealed under
///
/// Loaded once at startup and injected into the cipher box. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decode a base64-encoded 32-byte secret
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CipherError::InvalidSecret(format!("not valid base64: {}", e)))?;

        let bytes: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CipherError::InvalidSecret(format!(
                "secret must be {} bytes, got {}",
                SECRET_KEY_LEN,
                b.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Generate a fresh random secret
    pub fn generate() -> Self {
        Self(rand::thread_rng().r#gen())
    }

    /// Base64 form, for provisioning a new secret
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub(super) fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([hidden])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_round_trip() {
        let secret = SecretKey::generate();
        let restored = SecretKey::from_base64(&secret.to_base64()).unwrap();
        assert_eq!(secret, restored);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let short = STANDARD.encode([1u8; 16]);
        assert!(matches!(
            SecretKey::from_base64(&short),
            Err(CipherError::InvalidSecret(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(SecretKey::from_base64("not base64!!").is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretKey::from_bytes([7u8; SECRET_KEY_LEN]);
        let rendered = format!("{:?}", secret);
        assert_eq!(rendered, "SecretKey([hidden])");
        assert!(!rendered.contains(&secret.to_base64()));
    }
}
