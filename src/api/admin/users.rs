//! User admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{
    CreateUserParams, DomainError, Email, SpaceId, UpdateUserParams, User, UserId, UserRole,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: usize,
}

fn parse_email(value: &str) -> Result<Email, ApiError> {
    Ok(Email::new(value).map_err(DomainError::from)?)
}

/// GET /admin/spaces/{space_id}/users
pub async fn list_users(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let space_id = SpaceId::parse(&space_id)?;
    let users = state
        .querier
        .list_users_by_space(&state.context(), space_id)
        .await?;
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// POST /admin/spaces/{space_id}/users
pub async fn create_user(
    State(state): State<AppState>,
    Path(space_id): Path<String>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let space_id = SpaceId::parse(&space_id)?;
    let params = CreateUserParams::new(space_id, parse_email(&request.email)?, request.display_name)
        .with_role(request.role);

    let user = state.querier.create_user(&state.context(), params).await?;
    info!(id = %user.id, space_id = %space_id, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /admin/users/by-email/{email}
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    let email = parse_email(&email)?;
    Ok(Json(
        state.querier.get_user_by_email(&state.context(), &email).await?,
    ))
}

/// GET /admin/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = UserId::parse(&user_id)?;
    Ok(Json(state.querier.get_user(&state.context(), id).await?))
}

/// PUT /admin/users/{user_id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let id = UserId::parse(&user_id)?;
    let ctx = state.context();
    let current = state.querier.get_user(&ctx, id).await?;

    let mut params = UpdateUserParams::from_user(&current);
    if let Some(email) = request.email {
        params = params.with_email(parse_email(&email)?);
    }
    if let Some(display_name) = request.display_name {
        params = params.with_display_name(display_name);
    }
    if let Some(role) = request.role {
        params = params.with_role(role);
    }

    let user = state.querier.update_user(&ctx, params).await?;
    info!(id = %user.id, role = %user.role, "User updated");

    Ok(Json(user))
}

/// DELETE /admin/users/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = UserId::parse(&user_id)?;
    state.querier.delete_user(&state.context(), id).await?;

    info!(id = %id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
