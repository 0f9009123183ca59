//! Domain layer - credential entities, codecs and storage contracts

pub mod api_key;
pub mod error;
pub mod user;

pub use api_key::{
    ApiKeyRecord, ApiKeyRepository, IssueError, IssuedKey, KeyId, KeyPayload, NewApiKey,
    PayloadError, QuotaDecrement, ValidationError,
};
pub use error::DomainError;
pub use user::{AuthError, NewUser, UserId, UserIdentity, UserRepository};
