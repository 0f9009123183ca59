//! Symmetric cipher box
//!
//! AES-256-GCM with a fresh random nonce per seal. Sealed output layout:
//! nonce (12 bytes) followed by ciphertext and the 16-byte tag.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::Rng;
use thiserror::Error;

use super::secret::SecretKey;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Cipher box errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Wrong key, tampered bytes or truncated input
    #[error("Authentication failure")]
    AuthenticationFailure,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Invalid secret key: {0}")]
    InvalidSecret(String),
}

/// Authenticated encryption under one process-wide secret
#[derive(Clone)]
pub struct CipherBox {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CipherBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherBox")
            .field("cipher", &"AES-256-GCM")
            .field("key", &"[hidden]")
            .finish()
    }
}

impl CipherBox {
    pub fn new(secret: &SecretKey) -> Self {
        let key = aes_gcm::Key::<Aes256Gcm>::from_slice(secret.as_bytes());
        let cipher = Aes256Gcm::new(key);
        Self { cipher }
    }

    /// Encrypt and authenticate `plaintext`
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::thread_rng().r#gen();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(sealed)
    }

    /// Verify and decrypt sealed bytes, failing closed on any mismatch
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::AuthenticationFailure);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::AuthenticationFailure)
    }
}
