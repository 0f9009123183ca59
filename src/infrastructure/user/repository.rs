//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, UserId, UserIdentity, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, UserIdentity>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, UserId>,
    last_id: i64,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<UserIdentity>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserIdentity>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserIdentity, DomainError> {
        let mut table = self.table.write().await;

        if table.email_index.contains_key(&user.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already registered",
                user.email
            )));
        }

        let id = UserId::new(table.last_id + 1)
            .map_err(|e| DomainError::internal(e.to_string()))?;
        table.last_id = id.get();

        let identity = user.into_identity(id);
        table.email_index.insert(identity.email().to_string(), id);
        table.users.insert(id, identity.clone());

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryUserRepository::new();

        let user = repo.insert_user(NewUser::new("a@x.com", "h")).await.unwrap();
        assert_eq!(user.id().get(), 1);

        let by_id = repo.get_user(user.id()).await.unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_email = repo.get_user_by_email("a@x.com").await.unwrap();
        assert_eq!(by_email, Some(user));
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();

        repo.insert_user(NewUser::new("a@x.com", "h")).await.unwrap();

        assert!(repo.get_user_by_email("A@x.com").await.unwrap().is_none());
        assert!(repo.insert_user(NewUser::new("A@x.com", "h")).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();

        repo.insert_user(NewUser::new("a@x.com", "h")).await.unwrap();
        let result = repo.insert_user(NewUser::new("a@x.com", "h2")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_user_exists() {
        let repo = InMemoryUserRepository::new();
        let user = repo.insert_user(NewUser::new("a@x.com", "h")).await.unwrap();

        assert!(repo.user_exists(user.id()).await.unwrap());
        assert!(!repo.user_exists(UserId::new(77).unwrap()).await.unwrap());
    }
}
