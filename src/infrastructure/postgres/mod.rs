//! PostgreSQL implementation of the data-access contract
//!
//! Each operation is a single parameterized statement against the schema
//! defined in [`migrations`]. Driver errors are classified into
//! `NotFound`, `Conflict` and `Storage` domain errors.

mod api_key;
mod error;
pub mod migrations;
mod project;
mod space;
mod user;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::querier::assert_querier;
use crate::domain::{DomainError, QueryContext};

pub use migrations::{run_migrations, Migration, PostgresMigrator};

/// PostgreSQL implementation of [`crate::domain::Querier`]
#[derive(Debug, Clone)]
pub struct PostgresQuerier {
    pool: PgPool,
}

assert_querier!(PostgresQuerier);

impl PostgresQuerier {
    /// Create a querier over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let url = config.url.as_deref().ok_or_else(|| {
            DomainError::configuration("database.url (or DATABASE_URL) must be set")
        })?;

        info!(
            max_connections = config.max_connections,
            "Connecting to PostgreSQL..."
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .connect(url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!("PostgreSQL connection established");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial statement to check connectivity
    pub async fn ping(&self, ctx: &QueryContext) -> Result<(), DomainError> {
        ctx.run(async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| error::map_sqlx_error("ping database", e))?;
            Ok(())
        })
        .await
    }
}

/// Integration tests against a live database.
///
/// Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::*;

    async fn querier() -> PostgresQuerier {
        let config = DatabaseConfig {
            url: std::env::var("DATABASE_URL").ok(),
            ..DatabaseConfig::default()
        };

        let querier = PostgresQuerier::connect(&config).await.unwrap();
        run_migrations(querier.pool()).await.unwrap();
        querier
    }

    fn unique_slug(base: &str) -> Slug {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Slug::new(format!("{}-{}", base, &suffix[..12])).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_space_project_lifecycle() {
        let db = querier().await;
        let ctx = QueryContext::background();

        let space = db
            .create_space(&ctx, CreateSpaceParams::new("Acme", unique_slug("acme")))
            .await
            .unwrap();
        assert_eq!(db.get_space(&ctx, space.id).await.unwrap(), space);

        let web = Slug::new("web").unwrap();
        let project = db
            .create_project(&ctx, CreateProjectParams::new(space.id, "Web", web.clone()))
            .await
            .unwrap();

        let duplicate = db
            .create_project(&ctx, CreateProjectParams::new(space.id, "Web", web.clone()))
            .await;
        assert!(duplicate.unwrap_err().is_conflict());

        let found = db
            .get_project_by_slug(&ctx, &GetProjectBySlugParams::new(space.id, web))
            .await
            .unwrap();
        assert_eq!(found, project);

        let listed = db.list_projects_by_space(&ctx, space.id).await.unwrap();
        assert_eq!(listed, vec![project.clone()]);

        db.delete_space(&ctx, space.id).await.unwrap();
        assert!(db.get_space(&ctx, space.id).await.unwrap_err().is_not_found());
        assert!(db
            .get_project(&ctx, project.id)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_user_email_uniqueness() {
        let db = querier().await;
        let ctx = QueryContext::background();

        let space = db
            .create_space(&ctx, CreateSpaceParams::new("Acme", unique_slug("acme")))
            .await
            .unwrap();
        let email = Email::new(format!("{}@example.com", uuid::Uuid::new_v4())).unwrap();

        let user = db
            .create_user(&ctx, CreateUserParams::new(space.id, email.clone(), "Ada"))
            .await
            .unwrap();
        assert_eq!(db.get_user_by_email(&ctx, &email).await.unwrap(), user);

        let duplicate = db
            .create_user(&ctx, CreateUserParams::new(space.id, email, "Ada Again"))
            .await;
        assert!(duplicate.unwrap_err().is_conflict());

        db.delete_space(&ctx, space.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_api_key_last_used() {
        let db = querier().await;
        let ctx = QueryContext::background();

        let space = db
            .create_space(&ctx, CreateSpaceParams::new("Acme", unique_slug("acme")))
            .await
            .unwrap();
        let project = db
            .create_project(
                &ctx,
                CreateProjectParams::new(space.id, "Web", Slug::new("web").unwrap()),
            )
            .await
            .unwrap();

        let tag = uuid::Uuid::new_v4().simple().to_string();
        let key = db
            .create_api_key(
                &ctx,
                CreateApiKeyParams {
                    project_id: project.id,
                    name: "CI".to_string(),
                    key_prefix: format!("tk_test_{}", &tag[..8]),
                    key_hash: format!("sha256${}", tag),
                },
            )
            .await
            .unwrap();

        db.update_api_key_last_used(&ctx, key.id).await.unwrap();

        let touched = db.get_api_key(&ctx, key.id).await.unwrap();
        assert!(touched.last_used_at.is_some());
        assert_eq!(
            ApiKey {
                last_used_at: None,
                ..touched
            },
            key
        );

        db.delete_space(&ctx, space.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_requires_url() {
        let config = DatabaseConfig {
            url: None,
            ..DatabaseConfig::default()
        };

        let err = PostgresQuerier::connect(&config).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
