//! Space admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{CreateSpaceParams, DomainError, Slug, Space, SpaceId, UpdateSpaceParams};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpaceRequest {
    pub name: String,
    pub slug: String,
}

/// Omitted fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListSpacesResponse {
    pub spaces: Vec<Space>,
    pub total: usize,
}

pub(super) fn parse_slug(value: String) -> Result<Slug, ApiError> {
    Ok(Slug::new(value).map_err(DomainError::from)?)
}

/// GET /admin/spaces
pub async fn list_spaces(
    State(state): State<AppState>,
) -> Result<Json<ListSpacesResponse>, ApiError> {
    let spaces = state.querier.list_spaces(&state.context()).await?;
    let total = spaces.len();

    Ok(Json(ListSpacesResponse { spaces, total }))
}

/// POST /admin/spaces
pub async fn create_space(
    State(state): State<AppState>,
    Json(request): Json<CreateSpaceRequest>,
) -> Result<(StatusCode, Json<Space>), ApiError> {
    let params = CreateSpaceParams::new(request.name, parse_slug(request.slug)?);
    let space = state.querier.create_space(&state.context(), params).await?;

    info!(id = %space.id, slug = %space.slug, "Space created");

    Ok((StatusCode::CREATED, Json(space)))
}

/// GET /admin/spaces/{space_id}
pub async fn get_space(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> Result<Json<Space>, ApiError> {
    let id = SpaceId::parse(&space_id)?;
    Ok(Json(state.querier.get_space(&state.context(), id).await?))
}

/// GET /admin/spaces/by-slug/{slug}
pub async fn get_space_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Space>, ApiError> {
    let slug = parse_slug(slug)?;
    Ok(Json(
        state.querier.get_space_by_slug(&state.context(), &slug).await?,
    ))
}

/// PUT /admin/spaces/{space_id}
pub async fn update_space(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
    Json(request): Json<UpdateSpaceRequest>,
) -> Result<Json<Space>, ApiError> {
    let id = SpaceId::parse(&space_id)?;
    let ctx = state.context();
    let current = state.querier.get_space(&ctx, id).await?;

    let mut params = UpdateSpaceParams::from_space(&current);
    if let Some(name) = request.name {
        params = params.with_name(name);
    }
    if let Some(slug) = request.slug {
        params = params.with_slug(parse_slug(slug)?);
    }

    let space = state.querier.update_space(&ctx, params).await?;
    info!(id = %space.id, "Space updated");

    Ok(Json(space))
}

/// DELETE /admin/spaces/{space_id} - cascades to projects, users and keys
pub async fn delete_space(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SpaceId::parse(&space_id)?;
    state.querier.delete_space(&state.context(), id).await?;

    info!(id = %id, "Space deleted");

    Ok(StatusCode::NO_CONTENT)
}
