//! Project admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::spaces::parse_slug;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{
    CreateProjectParams, GetProjectBySlugParams, Project, ProjectId, SpaceId, UpdateProjectParams,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Omitted fields keep their current value; an empty description clears it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
    pub total: usize,
}

/// GET /admin/spaces/{space_id}/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> Result<Json<ListProjectsResponse>, ApiError> {
    let space_id = SpaceId::parse(&space_id)?;
    let projects = state
        .querier
        .list_projects_by_space(&state.context(), space_id)
        .await?;
    let total = projects.len();

    Ok(Json(ListProjectsResponse { projects, total }))
}

/// POST /admin/spaces/{space_id}/projects
pub async fn create_project(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let space_id = SpaceId::parse(&space_id)?;

    let mut params = CreateProjectParams::new(space_id, request.name, parse_slug(request.slug)?);
    if let Some(description) = request.description.filter(|d| !d.is_empty()) {
        params = params.with_description(description);
    }

    let project = state.querier.create_project(&state.context(), params).await?;
    info!(id = %project.id, space_id = %space_id, slug = %project.slug, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /admin/spaces/{space_id}/projects/{slug}
pub async fn get_project_by_slug(
    State(state): State<AppState>,
    Path((space_id, slug)): Path<(String, String)>,
) -> Result<Json<Project>, ApiError> {
    let params = GetProjectBySlugParams::new(SpaceId::parse(&space_id)?, parse_slug(slug)?);

    Ok(Json(
        state
            .querier
            .get_project_by_slug(&state.context(), &params)
            .await?,
    ))
}

/// GET /admin/projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    Ok(Json(state.querier.get_project(&state.context(), id).await?))
}

/// PUT /admin/projects/{project_id}
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    let ctx = state.context();
    let current = state.querier.get_project(&ctx, id).await?;

    let mut params = UpdateProjectParams::from_project(&current);
    if let Some(name) = request.name {
        params = params.with_name(name);
    }
    if let Some(slug) = request.slug {
        params = params.with_slug(parse_slug(slug)?);
    }
    if let Some(description) = request.description {
        params = params.with_description(Some(description).filter(|d| !d.is_empty()));
    }

    let project = state.querier.update_project(&ctx, params).await?;
    info!(id = %project.id, "Project updated");

    Ok(Json(project))
}

/// DELETE /admin/projects/{project_id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = ProjectId::parse(&project_id)?;
    state.querier.delete_project(&state.context(), id).await?;

    info!(id = %id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}
