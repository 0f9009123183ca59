//! Identity resolution across credential kinds

use std::sync::Arc;

use tracing::debug;

use crate::domain::api_key::ApiKeyRepository;
use crate::domain::user::{AuthError, UserId, UserIdentity, UserRepository};
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::user::{PasswordAuthenticator, PasswordHasher};

use super::session::SessionService;

/// A credential presented by a caller
#[derive(Clone)]
pub enum Credential {
    Password { email: String, password: String },
    ApiKey(String),
    Session(String),
}

impl Credential {
    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn api_key(token: impl Into<String>) -> Self {
        Self::ApiKey(token.into())
    }

    pub fn session(token: impl Into<String>) -> Self {
        Self::Session(token.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::ApiKey(_) => "api_key",
            Self::Session(_) => "session",
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"[hidden]")
                .finish(),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[hidden]").finish(),
            Self::Session(_) => f.debug_tuple("Session").field(&"[hidden]").finish(),
        }
    }
}

/// Maps any accepted credential to the user it belongs to
pub struct IdentityResolver<K, U, H>
where
    K: ApiKeyRepository + ?Sized,
    U: UserRepository + ?Sized,
    H: PasswordHasher,
{
    keys: Arc<ApiKeyService<K, U>>,
    passwords: Arc<PasswordAuthenticator<U, H>>,
    sessions: Arc<SessionService>,
    users: Arc<U>,
}

impl<K, U, H> std::fmt::Debug for IdentityResolver<K, U, H>
where
    K: ApiKeyRepository + ?Sized,
    U: UserRepository + ?Sized,
    H: PasswordHasher,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("keys", &self.keys)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl<K, U, H> IdentityResolver<K, U, H>
where
    K: ApiKeyRepository + ?Sized,
    U: UserRepository + ?Sized,
    H: PasswordHasher,
{
    pub fn new(
        keys: Arc<ApiKeyService<K, U>>,
        passwords: Arc<PasswordAuthenticator<U, H>>,
        sessions: Arc<SessionService>,
        users: Arc<U>,
    ) -> Self {
        Self {
            keys,
            passwords,
            sessions,
            users,
        }
    }

    /// Resolve a credential to a user
    ///
    /// Password failures surface as `InvalidCredentials`; every rejected key
    /// or session surfaces as `Unauthorized`. Accepting an API key consumes
    /// one use of its quota.
    pub async fn resolve(&self, credential: &Credential) -> Result<UserIdentity, AuthError> {
        let result = match credential {
            Credential::Password { email, password } => {
                self.passwords.authenticate(email, password).await
            }
            Credential::ApiKey(token) => {
                let owner_id = self.keys.validate_and_consume(token).await?;
                self.load_owner(owner_id).await
            }
            Credential::Session(token) => {
                let claims = self.sessions.validate(token)?;
                self.load_owner(claims.user_id()?).await
            }
        };

        if let Err(e) = &result {
            debug!(kind = credential.kind(), error = %e, "Credential not resolved");
        }

        result
    }

    async fn load_owner(&self, id: UserId) -> Result<UserIdentity, AuthError> {
        self.users
            .get_user(id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::api_key::InMemoryApiKeyRepository;
    use crate::infrastructure::auth::SessionConfig;
    use crate::infrastructure::crypto::{CipherBox, SecretKey};
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository};

    type TestResolver = IdentityResolver<InMemoryApiKeyRepository, InMemoryUserRepository, Argon2Hasher>;

    struct Fixture {
        resolver: TestResolver,
        keys: Arc<ApiKeyService<InMemoryApiKeyRepository, InMemoryUserRepository>>,
        key_store: Arc<InMemoryApiKeyRepository>,
        passwords: Arc<PasswordAuthenticator<InMemoryUserRepository, Argon2Hasher>>,
        sessions: Arc<SessionService>,
    }

    fn create_fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let key_store = Arc::new(InMemoryApiKeyRepository::new());
        let cipher = CipherBox::new(&SecretKey::generate());
        let keys = Arc::new(ApiKeyService::new(key_store.clone(), users.clone(), cipher));
        let passwords = Arc::new(PasswordAuthenticator::new(
            users.clone(),
            Arc::new(Argon2Hasher::new()),
        ));
        let sessions =
            Arc::new(SessionService::new(SessionConfig::new("resolver-test", 1)).unwrap());

        Fixture {
            resolver: IdentityResolver::new(
                keys.clone(),
                passwords.clone(),
                sessions.clone(),
                users,
            ),
            keys,
            key_store,
            passwords,
            sessions,
        }
    }

    #[tokio::test]
    async fn test_resolve_password() {
        let f = create_fixture();
        let user = f.passwords.register("a@x.com", "secret").await.unwrap();

        let resolved = f
            .resolver
            .resolve(&Credential::password("a@x.com", "secret"))
            .await
            .unwrap();
        assert_eq!(resolved.id(), user.id());

        assert!(matches!(
            f.resolver
                .resolve(&Credential::password("a@x.com", "wrong"))
                .await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_resolve_api_key_consumes_quota() {
        let f = create_fixture();
        let user = f.passwords.register("a@x.com", "secret").await.unwrap();
        let issued = f.keys.issue(user.id(), 1, "default").await.unwrap();
        let credential = Credential::api_key(issued.token.clone());

        let resolved = f.resolver.resolve(&credential).await.unwrap();
        assert_eq!(resolved.email(), "a@x.com");

        assert!(matches!(
            f.resolver.resolve(&credential).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejected_keys_look_the_same() {
        let f = create_fixture();
        let user = f.passwords.register("a@x.com", "secret").await.unwrap();
        let revoked = f.keys.issue(user.id(), 5, "revoked").await.unwrap();
        f.keys.revoke(revoked.id).await.unwrap();

        for token in [revoked.token.as_str(), "vk_AAAA", "garbage"] {
            assert!(matches!(
                f.resolver.resolve(&Credential::api_key(token)).await,
                Err(AuthError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn test_resolve_api_key_store_failure_is_transient() {
        let f = create_fixture();
        let user = f.passwords.register("a@x.com", "secret").await.unwrap();
        let issued = f.keys.issue(user.id(), 5, "default").await.unwrap();
        f.key_store.set_should_fail(true).await;

        let err = f
            .resolver
            .resolve(&Credential::api_key(issued.token))
            .await
            .unwrap_err();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_resolve_session() {
        let f = create_fixture();
        let user = f.passwords.register("a@x.com", "secret").await.unwrap();
        let token = f.sessions.issue(&user).unwrap();

        let resolved = f
            .resolver
            .resolve(&Credential::session(token))
            .await
            .unwrap();
        assert_eq!(resolved.id(), user.id());

        assert!(matches!(
            f.resolver.resolve(&Credential::session("not-a-jwt")).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn test_credential_debug_hides_secrets() {
        let debug = format!(
            "{:?} {:?}",
            Credential::password("a@x.com", "hunter2"),
            Credential::api_key("vk_secret-token")
        );

        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("vk_secret-token"));
    }
}
