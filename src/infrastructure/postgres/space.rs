//! PostgreSQL space queries

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

use super::error::{corrupt_row, map_sqlx_error};
use super::PostgresQuerier;
use crate::domain::{
    CreateSpaceParams, DomainError, QueryContext, Slug, Space, SpaceId, SpaceRepository,
    UpdateSpaceParams,
};

#[async_trait]
impl SpaceRepository for PostgresQuerier {
    async fn create_space(
        &self,
        ctx: &QueryContext,
        params: CreateSpaceParams,
    ) -> Result<Space, DomainError> {
        params.validate()?;
        debug!(slug = %params.slug, "Creating space");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                INSERT INTO spaces (name, slug)
                VALUES ($1, $2)
                RETURNING id, name, slug, created_at, updated_at
                "#,
            )
            .bind(params.name.as_str())
            .bind(params.slug.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create space", e))?;

            row_to_space(&row)
        })
        .await
    }

    async fn get_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<Space, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, slug, created_at, updated_at
                FROM spaces
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get space", e))?;

            match row {
                Some(row) => row_to_space(&row),
                None => Err(DomainError::not_found(format!("Space '{}' not found", id))),
            }
        })
        .await
    }

    async fn get_space_by_slug(
        &self,
        ctx: &QueryContext,
        slug: &Slug,
    ) -> Result<Space, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, name, slug, created_at, updated_at
                FROM spaces
                WHERE slug = $1
                "#,
            )
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get space by slug", e))?;

            match row {
                Some(row) => row_to_space(&row),
                None => Err(DomainError::not_found(format!("Space '{}' not found", slug))),
            }
        })
        .await
    }

    async fn list_spaces(&self, ctx: &QueryContext) -> Result<Vec<Space>, DomainError> {
        ctx.run(async {
            let rows = sqlx::query(
                r#"
                SELECT id, name, slug, created_at, updated_at
                FROM spaces
                ORDER BY created_at, id
                "#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list spaces", e))?;

            rows.iter().map(row_to_space).collect()
        })
        .await
    }

    async fn update_space(
        &self,
        ctx: &QueryContext,
        params: UpdateSpaceParams,
    ) -> Result<Space, DomainError> {
        params.validate()?;
        debug!(id = %params.id, slug = %params.slug, "Updating space");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                UPDATE spaces
                SET name = $2, slug = $3, updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, slug, created_at, updated_at
                "#,
            )
            .bind(params.id.as_uuid())
            .bind(params.name.as_str())
            .bind(params.slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update space", e))?;

            match row {
                Some(row) => row_to_space(&row),
                None => Err(DomainError::not_found(format!(
                    "Space '{}' not found",
                    params.id
                ))),
            }
        })
        .await
    }

    async fn delete_space(&self, ctx: &QueryContext, id: SpaceId) -> Result<(), DomainError> {
        debug!(id = %id, "Deleting space");

        ctx.run(async {
            let result = sqlx::query("DELETE FROM spaces WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete space", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!("Space '{}' not found", id)));
            }

            Ok(())
        })
        .await
    }
}

fn row_to_space(row: &PgRow) -> Result<Space, DomainError> {
    let slug: String = row
        .try_get("slug")
        .map_err(|e| corrupt_row("space", e))?;

    Ok(Space {
        id: row
            .try_get::<uuid::Uuid, _>("id")
            .map_err(|e| corrupt_row("space", e))?
            .into(),
        name: row.try_get("name").map_err(|e| corrupt_row("space", e))?,
        slug: Slug::new(slug).map_err(|e| corrupt_row("space", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt_row("space", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| corrupt_row("space", e))?,
    })
}
