//! API key verification for downstream services

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ApiKey;

pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/verify", post(verify_api_key))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub api_key: ApiKey,
}

/// POST /auth/verify
///
/// Resolves a presented secret and records its use. Unknown or tampered
/// secrets get 401.
pub async fn verify_api_key(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let api_key = state
        .api_keys
        .authenticate(&state.context(), &request.key)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid API key"))?;

    debug!(id = %api_key.id, project_id = %api_key.project_id, "API key verified");

    Ok(Json(VerifyResponse {
        valid: true,
        api_key,
    }))
}
