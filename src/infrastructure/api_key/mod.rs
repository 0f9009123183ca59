//! API key infrastructure implementations
//!
//! Token format, storage adapters and the key engine.

mod postgres_repository;
mod repository;
mod service;
mod token;

pub use postgres_repository::PostgresApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::ApiKeyService;
pub use token::{TokenFormat, DEFAULT_KEY_PREFIX};
