//! API key issuance and authentication

mod generator;
mod service;

pub use generator::{hash_secret, verify_secret, ApiKeyGenerator, GeneratedApiKey};
pub use service::{ApiKeyService, IssuedApiKey};
