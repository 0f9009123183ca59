//! Operator CLI for the credential core
//!
//! - `generate-secret`: print a fresh base64 sealing key
//! - `inspect`: decrypt an API key and print its payload
//! - `migrate`: apply the PostgreSQL schema

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::api_key::KeyPayload;
use crate::infrastructure::api_key::TokenFormat;
use crate::infrastructure::crypto::{CipherBox, SecretKey};
use crate::infrastructure::storage;

/// Vidcat Auth - credential issuance and validation
#[derive(Parser)]
#[command(name = "vidcat-auth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a new random 32-byte secret, base64 encoded
    GenerateSecret,

    /// Decrypt an API key with the configured secret without consuming it
    Inspect {
        /// The full token, including its prefix
        token: String,
    },

    /// Apply pending PostgreSQL migrations
    Migrate,
}

/// Print a fresh secret suitable for `auth.secret_key`
pub fn generate_secret() -> String {
    SecretKey::generate().to_base64()
}

/// Decrypt a token without touching storage
pub fn inspect(config: &AppConfig, token: &str) -> anyhow::Result<KeyPayload> {
    let cipher = CipherBox::new(&config.auth.secret_key()?);
    let format = TokenFormat::new(config.auth.key_prefix.clone());

    let sealed = format
        .decode(token)
        .ok_or_else(|| anyhow::anyhow!("token is not a well-formed API key"))?;
    let plaintext = cipher.open(&sealed)?;

    Ok(KeyPayload::decode(&plaintext)?)
}

/// Apply the schema to the configured database
pub async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let database_url = config
        .storage
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("storage.database_url is not set"))?;

    let pool = storage::connect(database_url, config.storage.max_connections).await?;
    let applied = storage::run_auth_migrations(&pool).await?;

    info!(applied, "Migrations complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;
    use chrono::Utc;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["vidcat-auth", "inspect", "vk_abc"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect { token } if token == "vk_abc"));

        let cli = Cli::try_parse_from(["vidcat-auth", "generate-secret"]).unwrap();
        assert!(matches!(cli.command, Command::GenerateSecret));

        assert!(Cli::try_parse_from(["vidcat-auth", "inspect"]).is_err());
    }

    #[test]
    fn test_generated_secret_loads() {
        assert!(SecretKey::from_base64(&generate_secret()).is_ok());
    }

    #[test]
    fn test_inspect_round_trip() {
        let secret = SecretKey::generate();
        let mut config = AppConfig::default();
        config.auth.secret_key = Some(secret.to_base64());

        let payload = KeyPayload::new(UserId::new(9).unwrap(), 10, "cli", Utc::now());
        let sealed = CipherBox::new(&secret).seal(&payload.encode()).unwrap();
        let token = TokenFormat::default().encode(&sealed);

        assert_eq!(inspect(&config, &token).unwrap(), payload);
    }

    #[test]
    fn test_inspect_rejects_foreign_token() {
        let mut config = AppConfig::default();
        config.auth.secret_key = Some(generate_secret());

        assert!(inspect(&config, "vk_AAAA").is_err());
        assert!(inspect(&config, "no-prefix").is_err());
    }
}
