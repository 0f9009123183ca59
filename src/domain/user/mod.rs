//! User domain
//!
//! Identities owned by the storage collaborator, plus the authentication
//! error taxonomy.

mod entity;
mod error;
mod repository;
mod validation;

pub use entity::{NewUser, UserId, UserIdentity};
pub use error::AuthError;
pub use repository::UserRepository;
#[cfg(test)]
pub use repository::MockUserRepository;
pub use validation::{validate_email, validate_password, UserValidationError};
