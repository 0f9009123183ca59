//! Cryptographic primitives for API key sealing

mod cipher;
mod secret;

pub use cipher::{CipherBox, CipherError};
pub use secret::{SecretKey, SECRET_KEY_LEN};
