//! API key admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ApiKey, ApiKeyId, ProjectId};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Returned once at issuance; the secret cannot be retrieved later
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyWithSecretResponse {
    #[serde(flatten)]
    pub api_key: ApiKey,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKey>,
    pub total: usize,
}

/// GET /admin/projects/{project_id}/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    let project_id = ProjectId::parse(&project_id)?;
    let api_keys = state
        .querier
        .list_api_keys_by_project(&state.context(), project_id)
        .await?;
    let total = api_keys.len();

    Ok(Json(ListApiKeysResponse { api_keys, total }))
}

/// POST /admin/projects/{project_id}/api-keys
pub async fn create_api_key(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyWithSecretResponse>), ApiError> {
    let project_id = ProjectId::parse(&project_id)?;
    let issued = state
        .api_keys
        .issue(&state.context(), project_id, request.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyWithSecretResponse {
            api_key: issued.api_key,
            secret: issued.secret,
        }),
    ))
}

/// GET /admin/api-keys/{key_id}
pub async fn get_api_key(
    State(state): State<AppState>,
    Path(key_id): Path<String>,
) -> Result<Json<ApiKey>, ApiError> {
    let id = ApiKeyId::parse(&key_id)?;
    Ok(Json(state.querier.get_api_key(&state.context(), id).await?))
}

/// DELETE /admin/api-keys/{key_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    Path(key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = ApiKeyId::parse(&key_id)?;
    state.querier.delete_api_key(&state.context(), id).await?;

    info!(id = %id, "API key deleted");

    Ok(StatusCode::NO_CONTENT)
}
