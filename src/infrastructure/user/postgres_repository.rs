//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::user::{NewUser, UserId, UserIdentity, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<UserIdentity>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserIdentity>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserIdentity, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Email '{}' already registered", user.email))
            } else {
                DomainError::storage(format!("Failed to create user: {}", e))
            }
        })?;

        let id = UserId::new(id)
            .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

        Ok(user.into_identity(id))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<UserIdentity, DomainError> {
    let id: i64 = row.get("id");
    let email: String = row.get("email");
    let password_hash: String = row.get("password_hash");
    let created_at: DateTime<Utc> = row.get("created_at");

    let user_id = UserId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(UserIdentity::from_parts(user_id, email, password_hash, created_at))
}
