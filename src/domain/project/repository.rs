//! Project repository trait

use async_trait::async_trait;

use super::entity::{
    CreateProjectParams, GetProjectBySlugParams, Project, ProjectId, UpdateProjectParams,
};
use crate::domain::space::SpaceId;
use crate::domain::{DomainError, QueryContext};

/// Data-access operations for projects
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project; `Conflict` when the slug is taken within the space or
    /// the space does not exist
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> Result<Project, DomainError>;

    async fn get_project(&self, ctx: &QueryContext, id: ProjectId)
        -> Result<Project, DomainError>;

    async fn get_project_by_slug(
        &self,
        ctx: &QueryContext,
        params: &GetProjectBySlugParams,
    ) -> Result<Project, DomainError>;

    /// Projects of one space, oldest first
    async fn list_projects_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<Project>, DomainError>;

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> Result<Project, DomainError>;

    /// Hard delete; API keys of the project go with it
    async fn delete_project(&self, ctx: &QueryContext, id: ProjectId) -> Result<(), DomainError>;
}
