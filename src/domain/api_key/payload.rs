//! Credential payload codec
//!
//! Binary framing of the fields sealed inside every API key:
//!
//! ```text
//! version:u8 | owner_id:i64 | usage_limit:i64 | issued_secs:i64 | issued_nanos:u32
//!            | name_len:u32 | key_name:[u8; name_len]
//! ```
//!
//! All integers are big-endian. The name is length-prefixed, so any UTF-8
//! label round-trips without escaping.

use bytes::{Buf, BufMut};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::user::UserId;

/// Current framing version
pub const PAYLOAD_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + 8 + 8 + 8 + 4 + 4;

/// Errors produced while decoding a payload
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Malformed payload: {0}")]
    Malformed(&'static str),
}

/// The plaintext embedded in every API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPayload {
    pub owner_id: UserId,
    /// Quota at issuance; the stored row holds the live value
    pub usage_limit: i64,
    pub key_name: String,
    pub issued_at: DateTime<Utc>,
}

impl KeyPayload {
    pub fn new(
        owner_id: UserId,
        usage_limit: i64,
        key_name: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            usage_limit,
            key_name: key_name.into(),
            issued_at,
        }
    }

    /// Serialize the payload into its framed byte form
    pub fn encode(&self) -> Vec<u8> {
        let name = self.key_name.as_bytes();
        let mut buf = Vec::with_capacity(HEADER_LEN + name.len());

        buf.put_u8(PAYLOAD_VERSION);
        buf.put_i64(self.owner_id.get());
        buf.put_i64(self.usage_limit);
        buf.put_i64(self.issued_at.timestamp());
        buf.put_u32(self.issued_at.timestamp_subsec_nanos());
        buf.put_u32(name.len() as u32);
        buf.put_slice(name);

        buf
    }

    /// Parse a framed payload, rejecting anything that is not exactly one
    /// well-typed payload
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let mut buf = bytes;

        if buf.remaining() < HEADER_LEN {
            return Err(PayloadError::Malformed("payload truncated"));
        }

        if buf.get_u8() != PAYLOAD_VERSION {
            return Err(PayloadError::Malformed("unsupported payload version"));
        }

        let owner_id = UserId::new(buf.get_i64())
            .map_err(|_| PayloadError::Malformed("owner id is not positive"))?;

        let usage_limit = buf.get_i64();
        if usage_limit < 0 {
            return Err(PayloadError::Malformed("negative usage limit"));
        }

        let secs = buf.get_i64();
        let nanos = buf.get_u32();
        let issued_at = DateTime::from_timestamp(secs, nanos)
            .ok_or(PayloadError::Malformed("issue time out of range"))?;

        let name_len = buf.get_u32() as usize;
        if buf.remaining() != name_len {
            return Err(PayloadError::Malformed("key name length mismatch"));
        }

        let key_name = std::str::from_utf8(buf)
            .map_err(|_| PayloadError::Malformed("key name is not UTF-8"))?;
        if key_name.is_empty() {
            return Err(PayloadError::Malformed("empty key name"));
        }

        Ok(Self {
            owner_id,
            usage_limit,
            key_name: key_name.to_string(),
            issued_at,
        })
    }
}
