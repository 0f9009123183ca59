//! Password authenticator for sign-up and sign-in

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{
    validate_email, validate_password, AuthError, NewUser, UserIdentity, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_sign_in;

use super::password::PasswordHasher;

/// Verifies and stores salted password hashes
pub struct PasswordAuthenticator<R: UserRepository + ?Sized, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository + ?Sized, H: PasswordHasher> std::fmt::Debug for PasswordAuthenticator<R, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordAuthenticator").finish_non_exhaustive()
    }
}

impl<R: UserRepository + ?Sized, H: PasswordHasher> PasswordAuthenticator<R, H> {
    /// Create a new authenticator
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    pub async fn register(&self, email: &str, password: &str) -> Result<UserIdentity, AuthError> {
        validate_email(email)?;
        validate_password(password)?;

        if self.repository.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        // A concurrent registration can still win the race; the store's
        // uniqueness check decides.
        let user = self
            .repository
            .insert_user(NewUser::new(email, password_hash))
            .await
            .map_err(|e| match e {
                DomainError::Conflict { .. } => AuthError::DuplicateEmail,
                other => AuthError::Storage(other),
            })?;

        info!(user_id = %user.id(), "User registered");

        Ok(user)
    }

    /// Authenticate with email and password
    ///
    /// An unknown email and a wrong password produce the same error, and an
    /// unknown email still pays for one Argon2 computation.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, AuthError> {
        let user = match self.repository.get_user_by_email(email).await? {
            Some(u) => u,
            None => {
                let _ = self.hasher.hash(password);
                record_sign_in(false);
                debug!("Sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, user.password_hash()) {
            record_sign_in(false);
            debug!("Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        record_sign_in(true);
        debug!(user_id = %user.id(), "Sign-in accepted");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, UserValidationError};
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn create_authenticator() -> PasswordAuthenticator<InMemoryUserRepository, Argon2Hasher> {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        PasswordAuthenticator::new(repository, hasher)
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let auth = create_authenticator();

        let user = auth.register("a@x.com", "secret").await.unwrap();

        assert_eq!(user.email(), "a@x.com");
        assert_ne!(user.password_hash(), "secret");
        assert!(user.password_hash().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = create_authenticator();

        auth.register("a@x.com", "secret").await.unwrap();
        let result = auth.register("a@x.com", "other-secret").await;

        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_register_invalid_input() {
        let auth = create_authenticator();

        assert!(matches!(
            auth.register("not-an-email", "secret").await,
            Err(AuthError::InvalidInput(UserValidationError::InvalidEmailFormat))
        ));
        assert!(matches!(
            auth.register("a@x.com", "").await,
            Err(AuthError::InvalidInput(UserValidationError::EmptyPassword))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let auth = create_authenticator();
        let registered = auth.register("a@x.com", "secret").await.unwrap();

        let user = auth.authenticate("a@x.com", "secret").await.unwrap();

        assert_eq!(user.id(), registered.id());
        assert_eq!(user.email(), "a@x.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = create_authenticator();
        auth.register("a@x.com", "secret").await.unwrap();

        let wrong_password = auth.authenticate("a@x.com", "wrong").await.unwrap_err();
        let unknown_email = auth.authenticate("missing@x.com", "secret").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_email_match_is_case_sensitive() {
        let auth = create_authenticator();
        auth.register("a@x.com", "secret").await.unwrap();

        assert!(matches!(
            auth.authenticate("A@X.COM", "secret").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_insert_race_maps_to_duplicate() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user_by_email()
            .returning(|_| Ok(None));
        repository
            .expect_insert_user()
            .returning(|_| Err(DomainError::conflict("unique violation")));

        let auth = PasswordAuthenticator::new(Arc::new(repository), Arc::new(Argon2Hasher::new()));

        assert!(matches!(
            auth.register("a@x.com", "secret").await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_transient() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user_by_email()
            .returning(|_| Err(DomainError::storage("connection refused")));

        let auth = PasswordAuthenticator::new(Arc::new(repository), Arc::new(Argon2Hasher::new()));
        let err = auth.authenticate("a@x.com", "secret").await.unwrap_err();

        assert!(err.is_transient());
    }
}
