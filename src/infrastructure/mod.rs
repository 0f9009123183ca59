//! Infrastructure layer - crypto, storage adapters and credential services

pub mod api_key;
pub mod auth;
pub mod crypto;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod user;
