//! API key domain
//!
//! Key rows, the sealed credential payload and its codec, and the
//! issuance/validation error taxonomy.

mod entity;
mod payload;
mod repository;
mod validation;

pub use entity::{ApiKeyRecord, IssuedKey, KeyId, NewApiKey, QuotaDecrement};
pub use payload::{KeyPayload, PayloadError, PAYLOAD_VERSION};
pub use repository::ApiKeyRepository;
#[cfg(test)]
pub use repository::MockApiKeyRepository;
pub use validation::{validate_key_name, validate_usage_limit, IssueError, ValidationError};
