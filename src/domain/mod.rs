//! Domain layer - entities, parameter bundles and the data-access contract

pub mod api_key;
pub mod context;
pub mod error;
pub(crate) mod id;
pub mod naming;
pub mod project;
pub mod querier;
pub mod space;
pub mod user;

pub use api_key::{ApiKey, ApiKeyId, ApiKeyRepository, CreateApiKeyParams};
#[cfg(test)]
pub use api_key::MockApiKeyRepository;
pub use context::{CancelHandle, QueryContext};
pub use error::DomainError;
pub use naming::{validate_name, validate_slug, NamingError, Slug};
pub use project::{
    CreateProjectParams, GetProjectBySlugParams, Project, ProjectId, ProjectRepository,
    UpdateProjectParams,
};
pub use querier::Querier;
pub use space::{CreateSpaceParams, Space, SpaceId, SpaceRepository, UpdateSpaceParams};
pub use user::{
    CreateUserParams, Email, UpdateUserParams, User, UserId, UserRepository, UserRole,
};
