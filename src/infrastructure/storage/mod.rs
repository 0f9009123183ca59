//! PostgreSQL plumbing shared by the storage adapters

mod migrations;

pub use migrations::{auth_migrations, run_auth_migrations, Migration, PostgresMigrator};

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::DomainError;

/// Whether a sqlx error is a unique-constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Whether a sqlx error is a foreign-key violation
pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

/// Open a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
    }
}
