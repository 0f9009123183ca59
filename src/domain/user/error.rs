//! Authentication errors as seen by callers of the credential core

use thiserror::Error;

use super::validation::UserValidationError;
use crate::domain::api_key::ValidationError;
use crate::domain::DomainError;

/// Errors returned by sign-up, sign-in and identity resolution
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Same error for an unknown email and a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] UserValidationError),

    /// Every rejected bearer key or session collapses into this variant
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Session token error: {0}")]
    Session(String),

    #[error(transparent)]
    Storage(DomainError),
}

impl AuthError {
    /// Whether the caller may retry the same request
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<DomainError> for AuthError {
    fn from(error: DomainError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationError> for AuthError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::Storage(inner) => Self::Storage(inner),
            ValidationError::Tampered
            | ValidationError::Corrupt
            | ValidationError::Revoked
            | ValidationError::QuotaExhausted => Self::Unauthorized,
        }
    }
}
