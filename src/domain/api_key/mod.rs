//! API Key domain
//!
//! API keys authenticate machine clients of a project. Only a hash and a
//! lookup prefix of each secret are stored.

mod entity;
mod repository;

pub use entity::{ApiKey, ApiKeyId, CreateApiKeyParams};
pub use repository::ApiKeyRepository;

#[cfg(test)]
pub use repository::MockApiKeyRepository;
