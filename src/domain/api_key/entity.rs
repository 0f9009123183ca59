//! API key records and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Store-assigned API key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(i64);

impl KeyId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The stored row behind an issued key
///
/// `usage_limit` here is the live quota and the only source of truth for
/// consumption and revocation. The token itself is never stored, only its
/// digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: KeyId,
    owner_id: UserId,
    key_name: String,
    usage_limit: i64,
    #[serde(skip_serializing, default)]
    token_digest: String,
    created_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    /// Rehydrate a record from stored fields
    pub fn from_parts(
        id: KeyId,
        owner_id: UserId,
        key_name: impl Into<String>,
        usage_limit: i64,
        token_digest: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            key_name: key_name.into(),
            usage_limit,
            token_digest: token_digest.into(),
            created_at,
        }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn usage_limit(&self) -> i64 {
        self.usage_limit
    }

    pub fn token_digest(&self) -> &str {
        &self.token_digest
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn has_quota(&self) -> bool {
        self.usage_limit > 0
    }

    /// Decrement the quota if any remains, returning whether it did
    pub fn consume(&mut self) -> bool {
        if self.has_quota() {
            self.usage_limit -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_usage_limit(&mut self, usage_limit: i64) {
        self.usage_limit = usage_limit;
    }
}

/// A key row that has not been persisted yet; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub owner_id: UserId,
    pub key_name: String,
    pub usage_limit: i64,
    pub token_digest: String,
    pub created_at: DateTime<Utc>,
}

impl NewApiKey {
    /// Attach the store-assigned id
    pub fn into_record(self, id: KeyId) -> ApiKeyRecord {
        ApiKeyRecord::from_parts(
            id,
            self.owner_id,
            self.key_name,
            self.usage_limit,
            self.token_digest,
            self.created_at,
        )
    }
}

/// The externally visible result of issuing a key
///
/// This is the only place the token is ever handed out.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedKey {
    pub id: KeyId,
    pub token: String,
    pub owner_id: UserId,
    pub key_name: String,
    pub usage_limit: i64,
    pub created_at: DateTime<Utc>,
}

impl IssuedKey {
    pub fn new(record: &ApiKeyRecord, token: String) -> Self {
        Self {
            id: record.id(),
            token,
            owner_id: record.owner_id(),
            key_name: record.key_name().to_string(),
            usage_limit: record.usage_limit(),
            created_at: record.created_at(),
        }
    }
}

/// Outcome of the store's atomic conditional decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecrement {
    /// One use was consumed; `remaining` is the quota after the decrement
    Consumed { remaining: i64 },
    /// The row exists but its quota is already zero
    Exhausted,
    /// No row with that id exists
    Missing,
}
