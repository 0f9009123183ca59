//! User input validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer, got {0}")]
    NonPositiveId(i64),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email must contain a single '@' between a local part and a domain")]
    InvalidEmailFormat,

    #[error("Email cannot contain whitespace")]
    EmailWhitespace,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Maximum 254 characters
/// - No whitespace
/// - Exactly one '@' with non-empty parts on both sides
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(UserValidationError::EmailWhitespace);
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(UserValidationError::InvalidEmailFormat),
    }
}

/// Validate a password
///
/// Rules:
/// - Cannot be empty
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("John.Doe+tag@example.org").is_ok());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@x.com", "a".repeat(250));
        assert_eq!(
            validate_email(&email),
            Err(UserValidationError::EmailTooLong(254))
        );
    }

    #[test]
    fn test_email_format() {
        assert_eq!(
            validate_email("no-at-sign"),
            Err(UserValidationError::InvalidEmailFormat)
        );
        assert_eq!(
            validate_email("@x.com"),
            Err(UserValidationError::InvalidEmailFormat)
        );
        assert_eq!(
            validate_email("a@"),
            Err(UserValidationError::InvalidEmailFormat)
        );
        assert_eq!(
            validate_email("a@b@c"),
            Err(UserValidationError::InvalidEmailFormat)
        );
    }

    #[test]
    fn test_email_whitespace() {
        assert_eq!(
            validate_email("a b@x.com"),
            Err(UserValidationError::EmailWhitespace)
        );
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("P@ssw0rd!").is_ok());
        assert!(validate_password("secret").is_ok());
    }

    #[test]
    fn test_empty_password() {
        assert_eq!(
            validate_password(""),
            Err(UserValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(129);
        assert_eq!(
            validate_password(&long_password),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }
}
