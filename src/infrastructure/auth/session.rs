//! Session token issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

use crate::domain::user::{AuthError, UserId, UserIdentity};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: i64,
    /// Email at the time of sign-in
    pub email: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    /// Create new claims for a user, valid for `ttl` from now
    pub fn new(user: &UserIdentity, ttl: Duration) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Session("session expiry out of range".to_string()))?;

        Ok(Self {
            sub: user.id().get(),
            email: user.email().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Get the user ID from claims
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::new(self.sub).map_err(|_| AuthError::Unauthorized)
    }
}

/// Configuration for session tokens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_HOURS: u64 = 24 * 366;

/// HS256 session token service
#[derive(Clone)]
pub struct SessionService {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("ttl", &self.ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl SessionService {
    /// Fails when the lifetime is zero or longer than `MAX_SESSION_HOURS`
    pub fn new(config: SessionConfig) -> Result<Self, AuthError> {
        if config.expiration_hours == 0 || config.expiration_hours > MAX_SESSION_HOURS {
            return Err(AuthError::Session(format!(
                "session expiration must be between 1 and {} hours, got {}",
                MAX_SESSION_HOURS, config.expiration_hours
            )));
        }

        let ttl = i64::try_from(config.expiration_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| AuthError::Session("session expiration out of range".to_string()))?;

        Ok(Self {
            ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// Sign a session token for an authenticated user
    pub fn issue(&self, user: &UserIdentity) -> Result<String, AuthError> {
        let claims = SessionClaims::new(user, self.ttl)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Session(format!("Failed to sign session: {}", e)))
    }

    /// Verify signature and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                AuthError::Unauthorized
            })
    }
}
