//! In-memory implementation of the data-access contract

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::querier::assert_querier;
use crate::domain::{
    ApiKey, ApiKeyId, ApiKeyRepository, CreateApiKeyParams, CreateProjectParams,
    CreateSpaceParams, CreateUserParams, DomainError, Email, GetProjectBySlugParams, Project,
    ProjectId, ProjectRepository, QueryContext, Slug, Space, SpaceId, SpaceRepository,
    UpdateProjectParams, UpdateSpaceParams, UpdateUserParams, User, UserId, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    spaces: HashMap<SpaceId, Space>,
    projects: HashMap<ProjectId, Project>,
    users: HashMap<UserId, User>,
    api_keys: HashMap<ApiKeyId, ApiKey>,
}

/// In-memory implementation of [`crate::domain::Querier`]
///
/// Enforces the same uniqueness, referential and cascade rules as the
/// PostgreSQL schema. A single lock makes every operation atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuerier {
    tables: Arc<RwLock<Tables>>,
}

assert_querier!(InMemoryQuerier);

impl InMemoryQuerier {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Oldest first, ties broken by id
fn sorted<T, F>(mut records: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, uuid::Uuid),
{
    records.sort_by_key(|r| key(r));
    records
}

#[async_trait]
impl SpaceRepository for InMemoryQuerier {
    async fn create_space(
        &self,
        ctx: &QueryContext,
        params: CreateSpaceParams,
    ) -> Result<Space, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if tables.spaces.values().any(|s| s.slug == params.slug) {
                return Err(DomainError::conflict(format!(
                    "Space slug '{}' already exists",
                    params.slug
                )));
            }

            let now = Utc::now();
            let space = Space {
                id: SpaceId::new(),
                name: params.name,
                slug: params.slug,
                created_at: now,
                updated_at: now,
            };

            tables.spaces.insert(space.id, space.clone());
            Ok(space)
        })
        .await
    }

    async fn get_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<Space, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .spaces
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("Space '{}' not found", id)))
        })
        .await
    }

    async fn get_space_by_slug(
        &self,
        ctx: &QueryContext,
        slug: &Slug,
    ) -> Result<Space, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .spaces
                .values()
                .find(|s| &s.slug == slug)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("Space '{}' not found", slug)))
        })
        .await
    }

    async fn list_spaces(&self, ctx: &QueryContext) -> Result<Vec<Space>, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            let spaces = tables.spaces.values().cloned().collect();
            Ok(sorted(spaces, |s| (s.created_at, s.id.as_uuid())))
        })
        .await
    }

    async fn update_space(
        &self,
        ctx: &QueryContext,
        params: UpdateSpaceParams,
    ) -> Result<Space, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if !tables.spaces.contains_key(&params.id) {
                return Err(DomainError::not_found(format!(
                    "Space '{}' not found",
                    params.id
                )));
            }

            let slug_taken = tables
                .spaces
                .values()
                .any(|s| s.slug == params.slug && s.id != params.id);

            if slug_taken {
                return Err(DomainError::conflict(format!(
                    "Space slug '{}' already exists",
                    params.slug
                )));
            }

            let space = tables
                .spaces
                .get_mut(&params.id)
                .ok_or_else(|| DomainError::not_found(format!("Space '{}' not found", params.id)))?;

            space.name = params.name;
            space.slug = params.slug;
            space.updated_at = Utc::now();

            Ok(space.clone())
        })
        .await
    }

    async fn delete_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<(), DomainError> {
        ctx.run(async {
            let mut tables = self.tables.write().await;

            if tables.spaces.remove(&id).is_none() {
                return Err(DomainError::not_found(format!("Space '{}' not found", id)));
            }

            let project_ids: Vec<ProjectId> = tables
                .projects
                .values()
                .filter(|p| p.space_id == id)
                .map(|p| p.id)
                .collect();

            tables.projects.retain(|_, p| p.space_id != id);
            tables.users.retain(|_, u| u.space_id != id);
            tables
                .api_keys
                .retain(|_, k| !project_ids.contains(&k.project_id));

            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProjectRepository for InMemoryQuerier {
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> Result<Project, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if !tables.spaces.contains_key(&params.space_id) {
                return Err(DomainError::conflict(format!(
                    "Space '{}' does not exist",
                    params.space_id
                )));
            }

            let slug_taken = tables
                .projects
                .values()
                .any(|p| p.space_id == params.space_id && p.slug == params.slug);

            if slug_taken {
                return Err(DomainError::conflict(format!(
                    "Project slug '{}' already exists in space '{}'",
                    params.slug, params.space_id
                )));
            }

            let now = Utc::now();
            let project = Project {
                id: ProjectId::new(),
                space_id: params.space_id,
                name: params.name,
                slug: params.slug,
                description: params.description,
                created_at: now,
                updated_at: now,
            };

            tables.projects.insert(project.id, project.clone());
            Ok(project)
        })
        .await
    }

    async fn get_project(
        &self,
        ctx: &QueryContext,
        id: ProjectId,
    ) -> Result<Project, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .projects
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("Project '{}' not found", id)))
        })
        .await
    }

    async fn get_project_by_slug(
        &self,
        ctx: &QueryContext,
        params: &GetProjectBySlugParams,
    ) -> Result<Project, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .projects
                .values()
                .find(|p| p.space_id == params.space_id && p.slug == params.slug)
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "Project '{}' not found in space '{}'",
                        params.slug, params.space_id
                    ))
                })
        })
        .await
    }

    async fn list_projects_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<Project>, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            let projects = tables
                .projects
                .values()
                .filter(|p| p.space_id == space_id)
                .cloned()
                .collect();
            Ok(sorted(projects, |p| (p.created_at, p.id.as_uuid())))
        })
        .await
    }

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> Result<Project, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            let space_id = tables
                .projects
                .get(&params.id)
                .map(|p| p.space_id)
                .ok_or_else(|| {
                    DomainError::not_found(format!("Project '{}' not found", params.id))
                })?;

            let slug_taken = tables.projects.values().any(|p| {
                p.space_id == space_id && p.slug == params.slug && p.id != params.id
            });

            if slug_taken {
                return Err(DomainError::conflict(format!(
                    "Project slug '{}' already exists in space '{}'",
                    params.slug, space_id
                )));
            }

            let project = tables.projects.get_mut(&params.id).ok_or_else(|| {
                DomainError::not_found(format!("Project '{}' not found", params.id))
            })?;

            project.name = params.name;
            project.slug = params.slug;
            project.description = params.description;
            project.updated_at = Utc::now();

            Ok(project.clone())
        })
        .await
    }

    async fn delete_project(&self, ctx: &QueryContext, id: ProjectId) -> Result<(), DomainError> {
        ctx.run(async {
            let mut tables = self.tables.write().await;

            if tables.projects.remove(&id).is_none() {
                return Err(DomainError::not_found(format!("Project '{}' not found", id)));
            }

            tables.api_keys.retain(|_, k| k.project_id != id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for InMemoryQuerier {
    async fn create_user(
        &self,
        ctx: &QueryContext,
        params: CreateUserParams,
    ) -> Result<User, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if !tables.spaces.contains_key(&params.space_id) {
                return Err(DomainError::conflict(format!(
                    "Space '{}' does not exist",
                    params.space_id
                )));
            }

            if tables.users.values().any(|u| u.email == params.email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    params.email
                )));
            }

            let now = Utc::now();
            let user = User {
                id: UserId::new(),
                space_id: params.space_id,
                email: params.email,
                display_name: params.display_name,
                role: params.role,
                created_at: now,
                updated_at: now,
            };

            tables.users.insert(user.id, user.clone());
            Ok(user)
        })
        .await
    }

    async fn get_user(&self, ctx: &QueryContext, id: UserId) -> Result<User, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
        })
        .await
    }

    async fn get_user_by_email(
        &self,
        ctx: &QueryContext,
        email: &Email,
    ) -> Result<User, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .users
                .values()
                .find(|u| &u.email == email)
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!("User with email '{}' not found", email))
                })
        })
        .await
    }

    async fn list_users_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<User>, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            let users = tables
                .users
                .values()
                .filter(|u| u.space_id == space_id)
                .cloned()
                .collect();
            Ok(sorted(users, |u| (u.created_at, u.id.as_uuid())))
        })
        .await
    }

    async fn update_user(
        &self,
        ctx: &QueryContext,
        params: UpdateUserParams,
    ) -> Result<User, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if !tables.users.contains_key(&params.id) {
                return Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    params.id
                )));
            }

            let email_taken = tables
                .users
                .values()
                .any(|u| u.email == params.email && u.id != params.id);

            if email_taken {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    params.email
                )));
            }

            let user = tables
                .users
                .get_mut(&params.id)
                .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", params.id)))?;

            user.email = params.email;
            user.display_name = params.display_name;
            user.role = params.role;
            user.updated_at = Utc::now();

            Ok(user.clone())
        })
        .await
    }

    async fn delete_user(&self, ctx: &QueryContext, id: UserId) -> Result<(), DomainError> {
        ctx.run(async {
            let mut tables = self.tables.write().await;

            match tables.users.remove(&id) {
                Some(_) => Ok(()),
                None => Err(DomainError::not_found(format!("User '{}' not found", id))),
            }
        })
        .await
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryQuerier {
    async fn create_api_key(
        &self,
        ctx: &QueryContext,
        params: CreateApiKeyParams,
    ) -> Result<ApiKey, DomainError> {
        params.validate()?;

        ctx.run(async {
            let mut tables = self.tables.write().await;

            if !tables.projects.contains_key(&params.project_id) {
                return Err(DomainError::conflict(format!(
                    "Project '{}' does not exist",
                    params.project_id
                )));
            }

            let duplicate = tables
                .api_keys
                .values()
                .any(|k| k.key_hash == params.key_hash || k.key_prefix == params.key_prefix);

            if duplicate {
                return Err(DomainError::conflict(format!(
                    "API key with prefix '{}' already exists",
                    params.key_prefix
                )));
            }

            let api_key = ApiKey {
                id: ApiKeyId::new(),
                project_id: params.project_id,
                name: params.name,
                key_prefix: params.key_prefix,
                key_hash: params.key_hash,
                last_used_at: None,
                created_at: Utc::now(),
            };

            tables.api_keys.insert(api_key.id, api_key.clone());
            Ok(api_key)
        })
        .await
    }

    async fn get_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .api_keys
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))
        })
        .await
    }

    async fn get_api_key_by_hash(
        &self,
        ctx: &QueryContext,
        key_hash: &str,
    ) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .api_keys
                .values()
                .find(|k| k.key_hash == key_hash)
                .cloned()
                .ok_or_else(|| DomainError::not_found("API key not found"))
        })
        .await
    }

    async fn get_api_key_by_prefix(
        &self,
        ctx: &QueryContext,
        key_prefix: &str,
    ) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            tables
                .api_keys
                .values()
                .find(|k| k.key_prefix == key_prefix)
                .cloned()
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "API key with prefix '{}' not found",
                        key_prefix
                    ))
                })
        })
        .await
    }

    async fn list_api_keys_by_project(
        &self,
        ctx: &QueryContext,
        project_id: ProjectId,
    ) -> Result<Vec<ApiKey>, DomainError> {
        ctx.run(async {
            let tables = self.tables.read().await;
            let keys = tables
                .api_keys
                .values()
                .filter(|k| k.project_id == project_id)
                .cloned()
                .collect();
            Ok(sorted(keys, |k| (k.created_at, k.id.as_uuid())))
        })
        .await
    }

    async fn update_api_key_last_used(
        &self,
        ctx: &QueryContext,
        id: ApiKeyId,
    ) -> Result<(), DomainError> {
        ctx.run(async {
            let mut tables = self.tables.write().await;

            match tables.api_keys.get_mut(&id) {
                Some(key) => {
                    key.last_used_at = Some(Utc::now());
                    Ok(())
                }
                None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
            }
        })
        .await
    }

    async fn delete_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<(), DomainError> {
        ctx.run(async {
            let mut tables = self.tables.write().await;

            match tables.api_keys.remove(&id) {
                Some(_) => Ok(()),
                None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use std::time::Duration;

    fn ctx() -> QueryContext {
        QueryContext::background()
    }

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::new(s).unwrap()
    }

    async fn create_space(repo: &InMemoryQuerier, s: &str) -> Space {
        repo.create_space(&ctx(), CreateSpaceParams::new(s.to_uppercase(), slug(s)))
            .await
            .unwrap()
    }

    async fn create_project(repo: &InMemoryQuerier, space_id: SpaceId, s: &str) -> Project {
        repo.create_project(&ctx(), CreateProjectParams::new(space_id, s, slug(s)))
            .await
            .unwrap()
    }

    fn key_params(project_id: ProjectId, tag: &str) -> CreateApiKeyParams {
        CreateApiKeyParams {
            project_id,
            name: format!("key {}", tag),
            key_prefix: format!("tk_test_{}", tag),
            key_hash: format!("sha256${}", tag),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_record() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        let project = create_project(&repo, space.id, "web").await;
        let user = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(space.id, email("ada@acme.io"), "Ada"),
            )
            .await
            .unwrap();
        let key = repo
            .create_api_key(&ctx(), key_params(project.id, "aaaa"))
            .await
            .unwrap();

        assert_eq!(repo.get_space(&ctx(), space.id).await.unwrap(), space);
        assert_eq!(repo.get_project(&ctx(), project.id).await.unwrap(), project);
        assert_eq!(repo.get_user(&ctx(), user.id).await.unwrap(), user);
        assert_eq!(repo.get_api_key(&ctx(), key.id).await.unwrap(), key);
    }

    #[tokio::test]
    async fn test_alternate_keys() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        let project = create_project(&repo, space.id, "web").await;
        let user = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(space.id, email("ada@acme.io"), "Ada"),
            )
            .await
            .unwrap();
        let key = repo
            .create_api_key(&ctx(), key_params(project.id, "bbbb"))
            .await
            .unwrap();

        assert_eq!(
            repo.get_space_by_slug(&ctx(), &slug("acme")).await.unwrap(),
            space
        );
        assert_eq!(
            repo.get_user_by_email(&ctx(), &email("ADA@acme.io")).await.unwrap(),
            user
        );
        assert_eq!(
            repo.get_api_key_by_hash(&ctx(), "sha256$bbbb").await.unwrap(),
            key
        );
        assert_eq!(
            repo.get_api_key_by_prefix(&ctx(), "tk_test_bbbb").await.unwrap(),
            key
        );
    }

    #[tokio::test]
    async fn test_project_slug_scoped_to_space() {
        let repo = InMemoryQuerier::new();
        let acme = create_space(&repo, "acme").await;
        let globex = create_space(&repo, "globex").await;

        let p1 = create_project(&repo, acme.id, "web").await;

        let duplicate = repo
            .create_project(&ctx(), CreateProjectParams::new(acme.id, "web", slug("web")))
            .await;
        assert!(duplicate.unwrap_err().is_conflict());

        let other_space = repo
            .create_project(&ctx(), CreateProjectParams::new(globex.id, "web", slug("web")))
            .await;
        assert!(other_space.is_ok());

        let found = repo
            .get_project_by_slug(&ctx(), &GetProjectBySlugParams::new(acme.id, slug("web")))
            .await
            .unwrap();
        assert_eq!(found, p1);
    }

    #[tokio::test]
    async fn test_duplicate_space_slug() {
        let repo = InMemoryQuerier::new();
        create_space(&repo, "acme").await;

        let result = repo
            .create_space(&ctx(), CreateSpaceParams::new("Other", slug("acme")))
            .await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryQuerier::new();
        let acme = create_space(&repo, "acme").await;
        let globex = create_space(&repo, "globex").await;

        repo.create_user(
            &ctx(),
            CreateUserParams::new(acme.id, email("ada@example.com"), "Ada"),
        )
        .await
        .unwrap();

        let result = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(globex.id, email("ada@example.com"), "Ada Again"),
            )
            .await;
        assert!(result.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_child_of_missing_parent_is_conflict() {
        let repo = InMemoryQuerier::new();

        let project = repo
            .create_project(
                &ctx(),
                CreateProjectParams::new(SpaceId::new(), "web", slug("web")),
            )
            .await;
        assert!(project.unwrap_err().is_conflict());

        let key = repo
            .create_api_key(&ctx(), key_params(ProjectId::new(), "cccc"))
            .await;
        assert!(key.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_list_projects_by_space() {
        let repo = InMemoryQuerier::new();
        let acme = create_space(&repo, "acme").await;
        let globex = create_space(&repo, "globex").await;

        let web = create_project(&repo, acme.id, "web").await;
        let api = create_project(&repo, acme.id, "api").await;
        create_project(&repo, globex.id, "web").await;

        let projects = repo.list_projects_by_space(&ctx(), acme.id).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects.contains(&web));
        assert!(projects.contains(&api));
        assert!(projects.iter().all(|p| p.space_id == acme.id));

        let empty = repo
            .list_projects_by_space(&ctx(), SpaceId::new())
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_list_spaces_ordered_by_creation() {
        let repo = InMemoryQuerier::new();
        let first = create_space(&repo, "first").await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = create_space(&repo, "second").await;

        let spaces = repo.list_spaces(&ctx()).await.unwrap();
        assert_eq!(spaces, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_space() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;

        let updated = repo
            .update_space(
                &ctx(),
                UpdateSpaceParams::from_space(&space)
                    .with_name("Acme Inc")
                    .with_slug(slug("acme-inc")),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Acme Inc");
        assert_eq!(updated.created_at, space.created_at);
        assert!(updated.updated_at >= space.updated_at);
        assert!(repo.get_space_by_slug(&ctx(), &slug("acme")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryQuerier::new();

        let result = repo
            .update_space(
                &ctx(),
                UpdateSpaceParams {
                    id: SpaceId::new(),
                    name: "Ghost".to_string(),
                    slug: slug("ghost"),
                },
            )
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_project_slug_conflict() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        create_project(&repo, space.id, "web").await;
        let api = create_project(&repo, space.id, "api").await;

        let result = repo
            .update_project(
                &ctx(),
                UpdateProjectParams::from_project(&api).with_slug(slug("web")),
            )
            .await;
        assert!(result.unwrap_err().is_conflict());

        let renamed = repo
            .update_project(
                &ctx(),
                UpdateProjectParams::from_project(&api)
                    .with_description(Some("Backend".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("Backend"));
    }

    #[tokio::test]
    async fn test_update_user_email_conflict() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        repo.create_user(
            &ctx(),
            CreateUserParams::new(space.id, email("ada@acme.io"), "Ada"),
        )
        .await
        .unwrap();
        let grace = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(space.id, email("grace@acme.io"), "Grace"),
            )
            .await
            .unwrap();

        let conflict = repo
            .update_user(
                &ctx(),
                UpdateUserParams::from_user(&grace).with_email(email("ada@acme.io")),
            )
            .await;
        assert!(conflict.unwrap_err().is_conflict());

        let promoted = repo
            .update_user(
                &ctx(),
                UpdateUserParams::from_user(&grace).with_role(UserRole::Admin),
            )
            .await
            .unwrap();
        assert_eq!(promoted.role, UserRole::Admin);
        assert_eq!(promoted.email, grace.email);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        let user = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(space.id, email("ada@acme.io"), "Ada"),
            )
            .await
            .unwrap();

        repo.delete_user(&ctx(), user.id).await.unwrap();
        assert!(repo.get_user(&ctx(), user.id).await.unwrap_err().is_not_found());

        let again = repo.delete_user(&ctx(), user.id).await;
        assert!(again.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_space_cascades() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        let project = create_project(&repo, space.id, "web").await;
        let key = repo
            .create_api_key(&ctx(), key_params(project.id, "dddd"))
            .await
            .unwrap();
        let user = repo
            .create_user(
                &ctx(),
                CreateUserParams::new(space.id, email("ada@acme.io"), "Ada"),
            )
            .await
            .unwrap();

        repo.delete_space(&ctx(), space.id).await.unwrap();

        assert!(repo.get_project(&ctx(), project.id).await.is_err());
        assert!(repo.get_user(&ctx(), user.id).await.is_err());
        assert!(repo.get_api_key(&ctx(), key.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_last_used_only_touches_timestamp() {
        let repo = InMemoryQuerier::new();
        let space = create_space(&repo, "acme").await;
        let project = create_project(&repo, space.id, "web").await;
        let key = repo
            .create_api_key(&ctx(), key_params(project.id, "eeee"))
            .await
            .unwrap();
        assert!(key.last_used_at.is_none());

        repo.update_api_key_last_used(&ctx(), key.id).await.unwrap();

        let touched = repo.get_api_key(&ctx(), key.id).await.unwrap();
        assert!(touched.last_used_at.is_some());
        assert_eq!(
            ApiKey {
                last_used_at: None,
                ..touched
            },
            key
        );

        let missing = repo.update_api_key_last_used(&ctx(), ApiKeyId::new()).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_cancelled_context() {
        let repo = InMemoryQuerier::new();
        let (ctx, handle) = QueryContext::cancellable();
        handle.cancel();

        let result = repo.list_spaces(&ctx).await;
        assert!(matches!(result, Err(DomainError::Cancelled)));
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_store() {
        let repo = InMemoryQuerier::new();

        let result = repo
            .create_space(&ctx(), CreateSpaceParams::new("", slug("acme")))
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(repo.list_spaces(&ctx()).await.unwrap().is_empty());
    }
}
