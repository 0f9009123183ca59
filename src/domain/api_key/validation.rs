//! API key input validation and error taxonomy

use thiserror::Error;

use super::entity::KeyId;
use crate::domain::DomainError;

/// Errors raised while issuing or administering a key
#[derive(Debug, Error)]
pub enum IssueError {
    #[error("Owner does not exist")]
    InvalidOwner,

    #[error("Usage limit must be non-negative, got {0}")]
    InvalidQuota(i64),

    #[error("Invalid key name: {0}")]
    InvalidKeyName(&'static str),

    #[error("API key '{0}' not found")]
    NotFound(KeyId),

    #[error("Failed to seal key payload: {0}")]
    Encryption(String),

    #[error(transparent)]
    Storage(#[from] DomainError),
}

impl IssueError {
    /// Input errors the caller should see as a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOwner
                | Self::InvalidQuota(_)
                | Self::InvalidKeyName(_)
                | Self::NotFound(_)
        )
    }
}

/// Errors raised while validating a presented key
///
/// The first four are terminal and are reported identically to callers;
/// they stay distinct here for logs and metrics.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Key failed authentication")]
    Tampered,

    #[error("Key payload is corrupt")]
    Corrupt,

    #[error("Key has been revoked")]
    Revoked,

    #[error("Key quota exhausted")]
    QuotaExhausted,

    #[error(transparent)]
    Storage(#[from] DomainError),
}

impl ValidationError {
    /// Store failures may be retried; every other variant is final
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Stable label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Tampered => "tampered",
            Self::Corrupt => "corrupt",
            Self::Revoked => "revoked",
            Self::QuotaExhausted => "quota_exhausted",
            Self::Storage(_) => "storage",
        }
    }
}

const MAX_KEY_NAME_LENGTH: usize = 255;

/// Validate a usage limit
pub fn validate_usage_limit(usage_limit: i64) -> Result<(), IssueError> {
    if usage_limit < 0 {
        return Err(IssueError::InvalidQuota(usage_limit));
    }

    Ok(())
}

/// Validate a key label
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 255 bytes
pub fn validate_key_name(key_name: &str) -> Result<(), IssueError> {
    if key_name.trim().is_empty() {
        return Err(IssueError::InvalidKeyName("name cannot be empty"));
    }

    if key_name.len() > MAX_KEY_NAME_LENGTH {
        return Err(IssueError::InvalidKeyName("name exceeds 255 bytes"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_limit() {
        assert!(validate_usage_limit(0).is_ok());
        assert!(validate_usage_limit(10).is_ok());
        assert!(matches!(
            validate_usage_limit(-1),
            Err(IssueError::InvalidQuota(-1))
        ));
    }

    #[test]
    fn test_key_name() {
        assert!(validate_key_name("ci pipeline").is_ok());
        assert!(validate_key_name("").is_err());
        assert!(validate_key_name("   ").is_err());
        assert!(validate_key_name(&"n".repeat(256)).is_err());
        assert!(validate_key_name(&"n".repeat(255)).is_ok());
    }

    #[test]
    fn test_client_errors() {
        assert!(IssueError::InvalidOwner.is_client_error());
        assert!(IssueError::InvalidQuota(-3).is_client_error());
        assert!(IssueError::NotFound(KeyId::new(4)).is_client_error());
        assert!(!IssueError::Storage(DomainError::storage("down")).is_client_error());
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(ValidationError::Tampered.reason(), "tampered");
        assert_eq!(ValidationError::QuotaExhausted.reason(), "quota_exhausted");
        assert!(ValidationError::Storage(DomainError::storage("x")).is_transient());
        assert!(!ValidationError::Revoked.is_transient());
    }
}
