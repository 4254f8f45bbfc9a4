//! Space repository trait

use async_trait::async_trait;

use super::entity::{CreateSpaceParams, Space, SpaceId, UpdateSpaceParams};
use crate::domain::{DomainError, QueryContext, Slug};

/// Data-access operations for spaces
#[async_trait]
pub trait SpaceRepository: Send + Sync {
    /// Insert a space; fails with `Conflict` when the slug is taken
    async fn create_space(
        &self,
        ctx: &QueryContext,
        params: CreateSpaceParams,
    ) -> Result<Space, DomainError>;

    async fn get_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<Space, DomainError>;

    async fn get_space_by_slug(&self, ctx: &QueryContext, slug: &Slug)
        -> Result<Space, DomainError>;

    /// All spaces, oldest first
    async fn list_spaces(&self, ctx: &QueryContext) -> Result<Vec<Space>, DomainError>;

    async fn update_space(
        &self,
        ctx: &QueryContext,
        params: UpdateSpaceParams,
    ) -> Result<Space, DomainError>;

    /// Hard delete; projects and users of the space go with it
    async fn delete_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<(), DomainError>;
}
