//! Admin API endpoints for managing registry resources

pub mod api_keys;
pub mod projects;
pub mod spaces;
pub mod users;

use axum::{routing::get, Router};

use super::state::AppState;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // Spaces
        .route("/spaces", get(spaces::list_spaces).post(spaces::create_space))
        .route("/spaces/by-slug/{slug}", get(spaces::get_space_by_slug))
        .route(
            "/spaces/{space_id}",
            get(spaces::get_space)
                .put(spaces::update_space)
                .delete(spaces::delete_space),
        )
        // Projects
        .route(
            "/spaces/{space_id}/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/spaces/{space_id}/projects/{slug}",
            get(projects::get_project_by_slug),
        )
        .route(
            "/projects/{project_id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Users
        .route(
            "/spaces/{space_id}/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/users/by-email/{email}", get(users::get_user_by_email))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // API keys
        .route(
            "/projects/{project_id}/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/api-keys/{key_id}",
            get(api_keys::get_api_key).delete(api_keys::delete_api_key),
        )
}
