//! User infrastructure module
//!
//! Password hashing with Argon2, user storage adapters and the password
//! authenticator.

mod authenticator;
mod password;
mod postgres_repository;
mod repository;

pub use authenticator::PasswordAuthenticator;
pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
