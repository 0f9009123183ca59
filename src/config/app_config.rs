use serde::Deserialize;

use crate::infrastructure::api_key::DEFAULT_KEY_PREFIX;
use crate::infrastructure::crypto::{CipherError, SecretKey};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Credential settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base64 encoding of the 32-byte key sealing API keys
    pub secret_key: Option<String>,
    /// Quota given to keys requested through sign-in
    pub default_usage_limit: i64,
    pub key_prefix: String,
    /// HMAC secret for session tokens; a random one is generated when unset
    pub session_secret: Option<String>,
    pub session_expiration_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            default_usage_limit: 10,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            session_secret: None,
            session_expiration_hours: 24,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[hidden]"))
            .field("default_usage_limit", &self.default_usage_limit)
            .field("key_prefix", &self.key_prefix)
            .field("session_secret", &self.session_secret.as_ref().map(|_| "[hidden]"))
            .field("session_expiration_hours", &self.session_expiration_hours)
            .finish()
    }
}

impl AuthConfig {
    /// Decode the configured sealing key
    pub fn secret_key(&self) -> Result<SecretKey, CipherError> {
        let encoded = self
            .secret_key
            .as_deref()
            .ok_or_else(|| CipherError::InvalidSecret("auth.secret_key is not set".to_string()))?;

        SecretKey::from_base64(encoded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
