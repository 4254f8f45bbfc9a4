//! API Key repository trait

use async_trait::async_trait;

use super::entity::{ApiKey, ApiKeyId, CreateApiKeyParams};
use crate::domain::project::ProjectId;
use crate::domain::{DomainError, QueryContext};

#[cfg(test)]
use mockall::automock;

/// Data-access operations for API keys
///
/// Keys are immutable once issued apart from the last-used timestamp.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Insert a key; `Conflict` when the hash or prefix is taken or the
    /// project does not exist
    async fn create_api_key(
        &self,
        ctx: &QueryContext,
        params: CreateApiKeyParams,
    ) -> Result<ApiKey, DomainError>;

    async fn get_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<ApiKey, DomainError>;

    async fn get_api_key_by_hash(
        &self,
        ctx: &QueryContext,
        key_hash: &str,
    ) -> Result<ApiKey, DomainError>;

    /// Lookup used during authentication
    async fn get_api_key_by_prefix(
        &self,
        ctx: &QueryContext,
        key_prefix: &str,
    ) -> Result<ApiKey, DomainError>;

    /// Keys of one project, oldest first
    async fn list_api_keys_by_project(
        &self,
        ctx: &QueryContext,
        project_id: ProjectId,
    ) -> Result<Vec<ApiKey>, DomainError>;

    /// Set `last_used_at` to now without touching any other field
    async fn update_api_key_last_used(
        &self,
        ctx: &QueryContext,
        id: ApiKeyId,
    ) -> Result<(), DomainError>;

    async fn delete_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<(), DomainError>;
}
