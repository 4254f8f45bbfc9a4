//! Versioned schema migrations

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Executor;
use tracing::info;

use crate::domain::DomainError;

/// Applies and reverts schema migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Apply every pending migration, returning how many ran
    async fn run(&self) -> Result<usize, DomainError>;

    /// Revert the latest applied migration, returning its version
    async fn revert(&self) -> Result<Option<i64>, DomainError>;

    /// Latest applied version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// A single schema change with its inverse
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    pub up: String,
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Migrator that records applied versions in a `_migrations` table
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    /// Migrator over the registry schema
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, schema_migrations())
    }

    pub fn with_migrations(pool: PgPool, migrations: Vec<Migration>) -> Self {
        Self { pool, migrations }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Versions already recorded, ascending
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar::<_, i64>("SELECT version FROM _migrations ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read applied migrations: {}", e)))
    }

    /// Apply one migration and record it in the same transaction
    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Executor::execute(tx.as_mut(), migration.up.as_str())
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))
    }

    async fn unapply(&self, migration: &Migration) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Executor::execute(tx.as_mut(), migration.down.as_str())
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit revert: {}", e)))
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<usize, DomainError> {
        let applied = self.applied_versions().await?;
        let mut count = 0;

        for migration in pending(&self.migrations, &applied) {
            info!(version = migration.version, description = %migration.description, "Applying migration");
            self.apply(migration).await?;
            count += 1;
        }

        Ok(count)
    }

    async fn revert(&self) -> Result<Option<i64>, DomainError> {
        let applied = self.applied_versions().await?;
        let Some(latest) = applied.last().copied() else {
            return Ok(None);
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == latest)
            .ok_or_else(|| {
                DomainError::internal(format!("Applied migration {} is unknown", latest))
            })?;

        info!(version = migration.version, description = %migration.description, "Reverting migration");
        self.unapply(migration).await?;

        Ok(Some(latest))
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        Ok(self.applied_versions().await?.last().copied())
    }
}

/// Migrations not yet in `applied`, in version order
fn pending<'a>(migrations: &'a [Migration], applied: &[i64]) -> Vec<&'a Migration> {
    let mut pending: Vec<&Migration> = migrations
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .collect();
    pending.sort_by_key(|m| m.version);
    pending
}

/// The registry schema
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create spaces table",
            r#"
            CREATE EXTENSION IF NOT EXISTS pgcrypto;
            CREATE TABLE spaces (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(63) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT spaces_slug_key UNIQUE (slug)
            );
            "#,
            "DROP TABLE IF EXISTS spaces;",
        ),
        Migration::new(
            2,
            "Create projects table",
            r#"
            CREATE TABLE projects (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                space_id UUID NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                slug VARCHAR(63) NOT NULL,
                description TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT projects_space_id_slug_key UNIQUE (space_id, slug)
            );
            CREATE INDEX idx_projects_space_id ON projects(space_id, created_at);
            "#,
            "DROP TABLE IF EXISTS projects;",
        ),
        Migration::new(
            3,
            "Create users table",
            r#"
            CREATE TABLE users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                space_id UUID NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
                email VARCHAR(254) NOT NULL,
                display_name VARCHAR(255) NOT NULL,
                role VARCHAR(16) NOT NULL DEFAULT 'member'
                    CHECK (role IN ('owner', 'admin', 'member')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_email_key UNIQUE (email)
            );
            CREATE INDEX idx_users_space_id ON users(space_id, created_at);
            "#,
            "DROP TABLE IF EXISTS users;",
        ),
        Migration::new(
            4,
            "Create api_keys table",
            r#"
            CREATE TABLE api_keys (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                name VARCHAR(255) NOT NULL,
                key_prefix VARCHAR(32) NOT NULL,
                key_hash VARCHAR(128) NOT NULL,
                last_used_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT api_keys_key_prefix_key UNIQUE (key_prefix),
                CONSTRAINT api_keys_key_hash_key UNIQUE (key_hash)
            );
            CREATE INDEX idx_api_keys_project_id ON api_keys(project_id, created_at);
            "#,
            "DROP TABLE IF EXISTS api_keys;",
        ),
    ]
}

/// Apply all pending registry migrations
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migrations_ascending() {
        let migrations = schema_migrations();

        assert_eq!(migrations.len(), 4);
        for pair in migrations.windows(2) {
            assert!(pair[1].version > pair[0].version);
        }
    }

    #[test]
    fn test_schema_migrations_reversible() {
        for migration in schema_migrations() {
            assert!(!migration.description.is_empty());
            assert!(migration.up.contains("CREATE TABLE"));
            assert!(migration.down.contains("DROP TABLE"));
        }
    }

    #[test]
    fn test_children_cascade_on_parent_delete() {
        let migrations = schema_migrations();

        for migration in &migrations[1..] {
            assert!(migration.up.contains("ON DELETE CASCADE"));
        }
    }

    #[test]
    fn test_pending_skips_applied() {
        let migrations = vec![
            Migration::new(3, "c", "up", "down"),
            Migration::new(1, "a", "up", "down"),
            Migration::new(2, "b", "up", "down"),
        ];

        let pending: Vec<i64> = pending(&migrations, &[1])
            .into_iter()
            .map(|m| m.version)
            .collect();

        assert_eq!(pending, vec![2, 3]);
    }

    #[test]
    fn test_pending_when_all_applied() {
        let migrations = schema_migrations();
        assert!(pending(&migrations, &[1, 2, 3, 4]).is_empty());
    }
}
