//! PostgreSQL API key repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository, KeyId, NewApiKey, QuotaDecrement};
use crate::domain::user::UserId;
use crate::domain::DomainError;
use crate::infrastructure::storage::{is_foreign_key_violation, is_unique_violation};

/// PostgreSQL implementation of ApiKeyRepository
#[derive(Debug, Clone)]
pub struct PostgresApiKeyRepository {
    pool: PgPool,
}

impl PostgresApiKeyRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PostgresApiKeyRepository {
    async fn insert_key(&self, key: NewApiKey) -> Result<ApiKeyRecord, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO api_keys (owner_id, key_name, usage_limit, token_digest, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(key.owner_id.get())
        .bind(&key.key_name)
        .bind(key.usage_limit)
        .bind(&key.token_digest)
        .bind(key.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict("API key with this token already exists")
            } else if is_foreign_key_violation(&e) {
                DomainError::not_found(format!("User '{}' not found", key.owner_id))
            } else {
                DomainError::storage(format!("Failed to insert API key: {}", e))
            }
        })?;

        Ok(key.into_record(KeyId::new(id)))
    }

    async fn get_key_by_id(&self, id: KeyId) -> Result<Option<ApiKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, key_name, usage_limit, token_digest, created_at
            FROM api_keys
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key: {}", e)))?;

        row.as_ref().map(row_to_key).transpose()
    }

    async fn get_key_by_digest(&self, digest: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, key_name, usage_limit, token_digest, created_at
            FROM api_keys
            WHERE token_digest = $1
            "#,
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get API key by digest: {}", e)))?;

        row.as_ref().map(row_to_key).transpose()
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, key_name, usage_limit, token_digest, created_at
            FROM api_keys
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_key).collect()
    }

    async fn list_keys_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, key_name, usage_limit, token_digest, created_at
            FROM api_keys
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list API keys: {}", e)))?;

        rows.iter().map(row_to_key).collect()
    }

    async fn delete_key(&self, id: KeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete API key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn decrement_key_quota_if_positive(
        &self,
        id: KeyId,
    ) -> Result<QuotaDecrement, DomainError> {
        // One statement: the conditional UPDATE is the decrement, the EXISTS
        // only classifies a miss as exhausted or deleted.
        let row = sqlx::query(
            r#"
            WITH consumed AS (
                UPDATE api_keys
                SET usage_limit = usage_limit - 1
                WHERE id = $1 AND usage_limit > 0
                RETURNING usage_limit
            )
            SELECT
                (SELECT usage_limit FROM consumed) AS remaining,
                EXISTS(SELECT 1 FROM api_keys WHERE id = $1) AS found
            "#,
        )
        .bind(id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to consume API key quota: {}", e)))?;

        let remaining: Option<i64> = row.get("remaining");
        let found: bool = row.get("found");

        Ok(match (remaining, found) {
            (Some(remaining), _) => QuotaDecrement::Consumed { remaining },
            (None, true) => QuotaDecrement::Exhausted,
            (None, false) => QuotaDecrement::Missing,
        })
    }

    async fn update_key_quota(
        &self,
        id: KeyId,
        usage_limit: i64,
    ) -> Result<Option<ApiKeyRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE api_keys
            SET usage_limit = $2
            WHERE id = $1
            RETURNING id, owner_id, key_name, usage_limit, token_digest, created_at
            "#,
        )
        .bind(id.get())
        .bind(usage_limit)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update API key quota: {}", e)))?;

        row.as_ref().map(row_to_key).transpose()
    }
}

fn row_to_key(row: &sqlx::postgres::PgRow) -> Result<ApiKeyRecord, DomainError> {
    let id: i64 = row.get("id");
    let owner_id: i64 = row.get("owner_id");
    let key_name: String = row.get("key_name");
    let usage_limit: i64 = row.get("usage_limit");
    let token_digest: String = row.get("token_digest");
    let created_at: DateTime<Utc> = row.get("created_at");

    let owner_id = UserId::new(owner_id)
        .map_err(|e| DomainError::storage(format!("Invalid owner ID in database: {}", e)))?;

    Ok(ApiKeyRecord::from_parts(
        KeyId::new(id),
        owner_id,
        key_name,
        usage_limit,
        token_digest,
        created_at,
    ))
}
