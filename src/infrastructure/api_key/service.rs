//! API key engine
//!
//! Mints sealed keys and validates presented ones. The stored row is the
//! source of truth for quota and revocation; the sealed payload only proves
//! provenance.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    validate_key_name, validate_usage_limit, ApiKeyRecord, ApiKeyRepository, IssueError,
    IssuedKey, KeyId, KeyPayload, NewApiKey, QuotaDecrement, ValidationError,
};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::crypto::CipherBox;
use crate::infrastructure::observability::{
    record_key_issued, record_key_revoked, record_key_validation,
};

use super::token::TokenFormat;

/// API key engine over a key store and a user store
pub struct ApiKeyService<K, U>
where
    K: ApiKeyRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    keys: Arc<K>,
    users: Arc<U>,
    cipher: CipherBox,
    format: TokenFormat,
}

impl<K: ApiKeyRepository + ?Sized, U: UserRepository + ?Sized> std::fmt::Debug for ApiKeyService<K, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyService")
            .field("cipher", &self.cipher)
            .field("format", &self.format)
            .finish()
    }
}

impl<K: ApiKeyRepository + ?Sized, U: UserRepository + ?Sized> ApiKeyService<K, U> {
    /// Create a new engine; the cipher carries the process secret
    pub fn new(keys: Arc<K>, users: Arc<U>, cipher: CipherBox) -> Self {
        Self {
            keys,
            users,
            cipher,
            format: TokenFormat::default(),
        }
    }

    /// Use a custom token format
    pub fn with_token_format(mut self, format: TokenFormat) -> Self {
        self.format = format;
        self
    }

    /// Mint a new key for an existing user
    pub async fn issue(
        &self,
        owner_id: UserId,
        usage_limit: i64,
        key_name: &str,
    ) -> Result<IssuedKey, IssueError> {
        validate_usage_limit(usage_limit)?;
        validate_key_name(key_name)?;

        if !self.users.user_exists(owner_id).await? {
            debug!(owner_id = %owner_id, "Refusing to issue key for unknown owner");
            return Err(IssueError::InvalidOwner);
        }

        let issued_at = Utc::now();
        let payload = KeyPayload::new(owner_id, usage_limit, key_name, issued_at);

        let sealed = self
            .cipher
            .seal(&payload.encode())
            .map_err(|e| IssueError::Encryption(e.to_string()))?;
        let token = self.format.encode(&sealed);

        let record = self
            .keys
            .insert_key(NewApiKey {
                owner_id,
                key_name: key_name.to_string(),
                usage_limit,
                token_digest: self.format.digest(&token),
                created_at: issued_at,
            })
            .await
            .map_err(|e| match e {
                // The owner was deleted after the existence check
                DomainError::NotFound { .. } => IssueError::InvalidOwner,
                other => IssueError::Storage(other),
            })?;

        record_key_issued();
        info!(key_id = %record.id(), owner_id = %owner_id, usage_limit, "API key issued");

        Ok(IssuedKey::new(&record, token))
    }

    /// Validate a presented token and consume one use of its quota
    pub async fn validate_and_consume(&self, token: &str) -> Result<UserId, ValidationError> {
        let result = self.consume(token).await;

        match &result {
            Ok(owner_id) => {
                record_key_validation("ok");
                debug!(owner_id = %owner_id, "API key accepted");
            }
            Err(e) if e.is_transient() => {
                record_key_validation(e.reason());
                warn!(error = %e, "API key validation hit a storage failure");
            }
            Err(e) => {
                record_key_validation(e.reason());
                warn!(reason = e.reason(), "API key rejected");
            }
        }

        result
    }

    async fn consume(&self, token: &str) -> Result<UserId, ValidationError> {
        let payload = self.open(token)?;

        let record = self
            .keys
            .get_key_by_digest(&self.format.digest(token))
            .await?
            .ok_or(ValidationError::Revoked)?;

        if record.owner_id() != payload.owner_id {
            return Err(ValidationError::Revoked);
        }

        match self.keys.decrement_key_quota_if_positive(record.id()).await? {
            QuotaDecrement::Consumed { remaining } => {
                debug!(key_id = %record.id(), remaining, "API key quota consumed");
                Ok(payload.owner_id)
            }
            QuotaDecrement::Exhausted => Err(ValidationError::QuotaExhausted),
            QuotaDecrement::Missing => Err(ValidationError::Revoked),
        }
    }

    /// Decrypt a token without touching its quota
    pub fn inspect(&self, token: &str) -> Result<KeyPayload, ValidationError> {
        self.open(token)
    }

    fn open(&self, token: &str) -> Result<KeyPayload, ValidationError> {
        let sealed = self.format.decode(token).ok_or(ValidationError::Tampered)?;

        let plaintext = self
            .cipher
            .open(&sealed)
            .map_err(|_| ValidationError::Tampered)?;

        KeyPayload::decode(&plaintext).map_err(|_| ValidationError::Corrupt)
    }

    /// Delete a key; its token stops validating even though it still decrypts
    pub async fn revoke(&self, key_id: KeyId) -> Result<bool, DomainError> {
        let deleted = self.keys.delete_key(key_id).await?;

        if deleted {
            record_key_revoked();
            info!(key_id = %key_id, "API key revoked");
        } else {
            debug!(key_id = %key_id, "Revoke requested for unknown API key");
        }

        Ok(deleted)
    }

    /// Administrative quota reset
    pub async fn update_quota(
        &self,
        key_id: KeyId,
        new_limit: i64,
    ) -> Result<ApiKeyRecord, IssueError> {
        validate_usage_limit(new_limit)?;

        let updated = self
            .keys
            .update_key_quota(key_id, new_limit)
            .await?
            .ok_or(IssueError::NotFound(key_id))?;

        info!(key_id = %key_id, usage_limit = new_limit, "API key quota updated");

        Ok(updated)
    }

    /// Get a key row by ID
    pub async fn get(&self, key_id: KeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.keys.get_key_by_id(key_id).await
    }

    /// List every key row (administrative)
    pub async fn list_all(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.keys.list_keys().await
    }

    /// List the key rows owned by a user
    pub async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.keys.list_keys_for_owner(owner_id).await
    }
}
