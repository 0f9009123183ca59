//! API key repository trait

use async_trait::async_trait;

use super::entity::{ApiKeyRecord, KeyId, NewApiKey, QuotaDecrement};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Storage verbs the key engine needs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Persist a new key row, assigning its ID
    ///
    /// Fails with `DomainError::NotFound` when the owner does not exist.
    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKeyRecord, DomainError>;

    /// Get a key row by its ID
    async fn get_key_by_id(&self, id: KeyId) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Get a key row by the digest of its token (for validation)
    async fn get_key_by_digest(&self, digest: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// List every key row, ordered by ID
    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// List all key rows owned by a user
    async fn list_keys_for_owner(&self, owner_id: UserId)
        -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Delete a key row, returning whether it existed
    async fn delete_key(&self, id: KeyId) -> Result<bool, DomainError>;

    /// Atomically decrement the quota where `id` matches and the quota is
    /// positive
    ///
    /// Must be a single step against the store; never a read followed by a
    /// separate write.
    async fn decrement_key_quota_if_positive(&self, id: KeyId)
        -> Result<QuotaDecrement, DomainError>;

    /// Overwrite the quota, returning the updated row if it exists
    async fn update_key_quota(
        &self,
        id: KeyId,
        usage_limit: i64,
    ) -> Result<Option<ApiKeyRecord>, DomainError>;
}
