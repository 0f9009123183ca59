//! Vidcat Auth
//!
//! Credential core for the video catalog service:
//! - Password sign-up and sign-in with Argon2id hashes
//! - Sealed, quota-limited API keys (AES-256-GCM)
//! - Signed session tokens
//! - A single resolver mapping any credential to a user

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use config::{AuthConfig, StorageBackend};
use domain::api_key::{ApiKeyRepository, IssueError, IssuedKey};
use domain::user::{AuthError, UserIdentity, UserRepository};
use infrastructure::api_key::{
    ApiKeyService, InMemoryApiKeyRepository, PostgresApiKeyRepository, TokenFormat,
};
use infrastructure::auth::{Credential, IdentityResolver, SessionConfig, SessionService};
use infrastructure::crypto::CipherBox;
use infrastructure::storage;
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PasswordAuthenticator, PostgresUserRepository,
};

pub type DynApiKeyService = ApiKeyService<dyn ApiKeyRepository, dyn UserRepository>;
pub type DynPasswordAuthenticator = PasswordAuthenticator<dyn UserRepository, Argon2Hasher>;
pub type DynIdentityResolver =
    IdentityResolver<dyn ApiKeyRepository, dyn UserRepository, Argon2Hasher>;

/// Failure of the sign-in-then-issue flow
#[derive(Debug, Error)]
pub enum RequestKeyError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Issue(#[from] IssueError),
}

/// Every credential service wired over one pair of stores
#[derive(Clone)]
pub struct AuthCore {
    pub keys: Arc<DynApiKeyService>,
    pub passwords: Arc<DynPasswordAuthenticator>,
    pub sessions: Arc<SessionService>,
    pub resolver: Arc<DynIdentityResolver>,
    default_usage_limit: i64,
}

impl std::fmt::Debug for AuthCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCore")
            .field("resolver", &self.resolver)
            .field("default_usage_limit", &self.default_usage_limit)
            .finish_non_exhaustive()
    }
}

impl AuthCore {
    /// Wire the services over the given stores
    pub fn new(
        key_store: Arc<dyn ApiKeyRepository>,
        user_store: Arc<dyn UserRepository>,
        config: &AuthConfig,
    ) -> anyhow::Result<Self> {
        let cipher = CipherBox::new(&config.secret_key()?);

        let keys = Arc::new(
            ApiKeyService::new(key_store, user_store.clone(), cipher)
                .with_token_format(TokenFormat::new(config.key_prefix.clone())),
        );
        let passwords = Arc::new(PasswordAuthenticator::new(
            user_store.clone(),
            Arc::new(Argon2Hasher::new()),
        ));
        let sessions = Arc::new(SessionService::new(SessionConfig::new(
            session_secret(config),
            config.session_expiration_hours,
        ))?);
        let resolver = Arc::new(IdentityResolver::new(
            keys.clone(),
            passwords.clone(),
            sessions.clone(),
            user_store,
        ));

        Ok(Self {
            keys,
            passwords,
            sessions,
            resolver,
            default_usage_limit: config.default_usage_limit,
        })
    }

    /// Sign in with a password and mint a session token
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserIdentity, String), AuthError> {
        let user = self.passwords.authenticate(email, password).await?;
        let token = self.sessions.issue(&user)?;

        Ok((user, token))
    }

    /// Resolve the caller, then issue them a key with the default quota
    pub async fn request_api_key(
        &self,
        credential: &Credential,
        key_name: &str,
    ) -> Result<IssuedKey, RequestKeyError> {
        let user = self.resolver.resolve(credential).await?;

        Ok(self
            .keys
            .issue(user.id(), self.default_usage_limit, key_name)
            .await?)
    }

    pub fn default_usage_limit(&self) -> i64 {
        self.default_usage_limit
    }
}

/// Build the credential core for the configured storage backend
pub async fn create_auth_core(config: &AppConfig) -> anyhow::Result<AuthCore> {
    let (key_store, user_store): (Arc<dyn ApiKeyRepository>, Arc<dyn UserRepository>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory credential storage");
                (
                    Arc::new(InMemoryApiKeyRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                )
            }
            StorageBackend::Postgres => {
                let database_url = config
                    .storage
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for postgres"))?;

                info!("Connecting to PostgreSQL...");
                let pool = storage::connect(database_url, config.storage.max_connections).await?;
                let applied = storage::run_auth_migrations(&pool).await?;
                info!(applied, "PostgreSQL credential storage ready");

                (
                    Arc::new(PostgresApiKeyRepository::new(pool.clone())),
                    Arc::new(PostgresUserRepository::new(pool)),
                )
            }
        };

    AuthCore::new(key_store, user_store, &config.auth)
}

fn session_secret(config: &AuthConfig) -> String {
    config.session_secret.clone().unwrap_or_else(|| {
        warn!("No auth.session_secret configured. Generating a random one; sessions will not survive a restart.");
        generate_random_secret()
    })
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::SecretKey;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret_key = Some(SecretKey::generate().to_base64());
        config.auth.session_secret = Some("core-test-session".to_string());
        config
    }

    #[tokio::test]
    async fn test_create_requires_secret() {
        let result = create_auth_core(&AppConfig::default()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let mut config = test_config();
        config.storage.backend = StorageBackend::Postgres;

        assert!(create_auth_core(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_session_expiration() {
        let mut config = test_config();
        config.auth.session_expiration_hours = u64::MAX;

        assert!(create_auth_core(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_request_api_key_with_password() {
        let core = create_auth_core(&test_config()).await.unwrap();
        let user = core.passwords.register("a@x.com", "secret").await.unwrap();

        let issued = core
            .request_api_key(&Credential::password("a@x.com", "secret"), "default")
            .await
            .unwrap();

        assert_eq!(issued.owner_id, user.id());
        assert_eq!(issued.usage_limit, 10);
        assert!(issued.token.starts_with("vk_"));

        let resolved = core
            .resolver
            .resolve(&Credential::api_key(issued.token))
            .await
            .unwrap();
        assert_eq!(resolved.id(), user.id());
    }

    #[tokio::test]
    async fn test_request_api_key_rejects_bad_password() {
        let core = create_auth_core(&test_config()).await.unwrap();
        core.passwords.register("a@x.com", "secret").await.unwrap();

        let result = core
            .request_api_key(&Credential::password("a@x.com", "nope"), "default")
            .await;

        assert!(matches!(
            result,
            Err(RequestKeyError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_request_api_key_rejects_blank_name() {
        let core = create_auth_core(&test_config()).await.unwrap();
        core.passwords.register("a@x.com", "secret").await.unwrap();

        let result = core
            .request_api_key(&Credential::password("a@x.com", "secret"), "  ")
            .await;

        assert!(matches!(
            result,
            Err(RequestKeyError::Issue(IssueError::InvalidKeyName(_)))
        ));
    }

    #[tokio::test]
    async fn test_sign_in_session_resolves() {
        let core = create_auth_core(&test_config()).await.unwrap();
        let user = core.passwords.register("a@x.com", "secret").await.unwrap();

        let (signed_in, token) = core.sign_in("a@x.com", "secret").await.unwrap();
        assert_eq!(signed_in.id(), user.id());

        let issued = core
            .request_api_key(&Credential::session(token), "from-session")
            .await
            .unwrap();
        assert_eq!(issued.owner_id, user.id());
    }

    #[tokio::test]
    async fn test_custom_prefix_and_quota() {
        let mut config = test_config();
        config.auth.key_prefix = "cat_".to_string();
        config.auth.default_usage_limit = 3;
        let core = create_auth_core(&config).await.unwrap();
        core.passwords.register("a@x.com", "secret").await.unwrap();

        let issued = core
            .request_api_key(&Credential::password("a@x.com", "secret"), "default")
            .await
            .unwrap();

        assert!(issued.token.starts_with("cat_"));
        assert_eq!(issued.usage_limit, 3);
    }
}
