//! User repository trait

use async_trait::async_trait;

use super::entity::{NewUser, UserId, UserIdentity};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Storage verbs the credential core needs for users
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get_user(&self, id: UserId) -> Result<Option<UserIdentity>, DomainError>;

    /// Get a user by their exact email (for sign-in)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserIdentity>, DomainError>;

    /// Insert a user, assigning its ID
    ///
    /// Fails with `DomainError::Conflict` when the email is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserIdentity, DomainError>;

    /// Check if a user ID exists
    async fn user_exists(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(self.get_user(id).await?.is_some())
    }
}
