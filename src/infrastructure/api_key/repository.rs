//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository, KeyId, NewApiKey, QuotaDecrement};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct KeyTable {
    keys: HashMap<KeyId, ApiKeyRecord>,
    digest_index: HashMap<String, KeyId>,
    last_id: i64,
}

/// In-memory implementation of ApiKeyRepository
///
/// Every verb runs under a single lock acquisition, so the conditional
/// decrement is atomic with respect to concurrent callers.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    table: Arc<RwLock<KeyTable>>,
    should_fail: Arc<RwLock<bool>>,
}

impl InMemoryApiKeyRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a storage error
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    async fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().await {
            return Err(DomainError::storage("In-memory key store configured to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKeyRecord, DomainError> {
        self.check_should_fail().await?;
        let mut table = self.table.write().await;

        if table.digest_index.contains_key(&key.token_digest) {
            return Err(DomainError::conflict("API key with this token already exists"));
        }

        table.last_id += 1;
        let id = KeyId::new(table.last_id);
        let record = key.into_record(id);

        table
            .digest_index
            .insert(record.token_digest().to_string(), id);
        table.keys.insert(id, record.clone());

        Ok(record)
    }

    async fn get_key_by_id(&self, id: KeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.check_should_fail().await?;
        let table = self.table.read().await;
        Ok(table.keys.get(&id).cloned())
    }

    async fn get_key_by_digest(&self, digest: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.check_should_fail().await?;
        let table = self.table.read().await;

        Ok(table
            .digest_index
            .get(digest)
            .and_then(|id| table.keys.get(id))
            .cloned())
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.check_should_fail().await?;
        let table = self.table.read().await;

        let mut result: Vec<ApiKeyRecord> = table.keys.values().cloned().collect();
        result.sort_by_key(|k| k.id());

        Ok(result)
    }

    async fn list_keys_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.check_should_fail().await?;
        let table = self.table.read().await;

        let mut result: Vec<ApiKeyRecord> = table
            .keys
            .values()
            .filter(|k| k.owner_id() == owner_id)
            .cloned()
            .collect();
        result.sort_by_key(|k| k.id());

        Ok(result)
    }

    async fn delete_key(&self, id: KeyId) -> Result<bool, DomainError> {
        self.check_should_fail().await?;
        let mut table = self.table.write().await;

        if let Some(key) = table.keys.remove(&id) {
            table.digest_index.remove(key.token_digest());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn decrement_key_quota_if_positive(
        &self,
        id: KeyId,
    ) -> Result<QuotaDecrement, DomainError> {
        self.check_should_fail().await?;
        let mut table = self.table.write().await;

        let outcome = match table.keys.get_mut(&id) {
            None => QuotaDecrement::Missing,
            Some(key) => {
                if key.consume() {
                    QuotaDecrement::Consumed {
                        remaining: key.usage_limit(),
                    }
                } else {
                    QuotaDecrement::Exhausted
                }
            }
        };

        Ok(outcome)
    }

    async fn update_key_quota(
        &self,
        id: KeyId,
        usage_limit: i64,
    ) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.check_should_fail().await?;
        let mut table = self.table.write().await;

        Ok(table.keys.get_mut(&id).map(|key| {
            key.set_usage_limit(usage_limit);
            key.clone()
        }))
    }
}
