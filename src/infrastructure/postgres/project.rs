//! PostgreSQL project queries

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

use super::error::{corrupt_row, map_sqlx_error};
use super::PostgresQuerier;
use crate::domain::{
    CreateProjectParams, DomainError, GetProjectBySlugParams, Project, ProjectId,
    ProjectRepository, QueryContext, Slug, SpaceId, UpdateProjectParams,
};

#[async_trait]
impl ProjectRepository for PostgresQuerier {
    async fn create_project(
        &self,
        ctx: &QueryContext,
        params: CreateProjectParams,
    ) -> Result<Project, DomainError> {
        params.validate()?;
        debug!(space_id = %params.space_id, slug = %params.slug, "Creating project");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                INSERT INTO projects (space_id, name, slug, description)
                VALUES ($1, $2, $3, $4)
                RETURNING id, space_id, name, slug, description, created_at, updated_at
                "#,
            )
            .bind(params.space_id.as_uuid())
            .bind(params.name.as_str())
            .bind(params.slug.as_str())
            .bind(params.description.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create project", e))?;

            row_to_project(&row)
        })
        .await
    }

    async fn get_project(
        &self,
        ctx: &QueryContext,
        id: ProjectId,
    ) -> Result<Project, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, space_id, name, slug, description, created_at, updated_at
                FROM projects
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get project", e))?;

            match row {
                Some(row) => row_to_project(&row),
                None => Err(DomainError::not_found(format!("Project '{}' not found", id))),
            }
        })
        .await
    }

    async fn get_project_by_slug(
        &self,
        ctx: &QueryContext,
        params: &GetProjectBySlugParams,
    ) -> Result<Project, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, space_id, name, slug, description, created_at, updated_at
                FROM projects
                WHERE space_id = $1 AND slug = $2
                "#,
            )
            .bind(params.space_id.as_uuid())
            .bind(params.slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get project by slug", e))?;

            match row {
                Some(row) => row_to_project(&row),
                None => Err(DomainError::not_found(format!(
                    "Project '{}' not found in space '{}'",
                    params.slug, params.space_id
                ))),
            }
        })
        .await
    }

    async fn list_projects_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<Project>, DomainError> {
        ctx.run(async {
            let rows = sqlx::query(
                r#"
                SELECT id, space_id, name, slug, description, created_at, updated_at
                FROM projects
                WHERE space_id = $1
                ORDER BY created_at, id
                "#,
            )
            .bind(space_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list projects", e))?;

            rows.iter().map(row_to_project).collect()
        })
        .await
    }

    async fn update_project(
        &self,
        ctx: &QueryContext,
        params: UpdateProjectParams,
    ) -> Result<Project, DomainError> {
        params.validate()?;
        debug!(id = %params.id, slug = %params.slug, "Updating project");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                UPDATE projects
                SET name = $2, slug = $3, description = $4, updated_at = NOW()
                WHERE id = $1
                RETURNING id, space_id, name, slug, description, created_at, updated_at
                "#,
            )
            .bind(params.id.as_uuid())
            .bind(params.name.as_str())
            .bind(params.slug.as_str())
            .bind(params.description.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update project", e))?;

            match row {
                Some(row) => row_to_project(&row),
                None => Err(DomainError::not_found(format!(
                    "Project '{}' not found",
                    params.id
                ))),
            }
        })
        .await
    }

    async fn delete_project(&self, ctx: &QueryContext, id: ProjectId) -> Result<(), DomainError> {
        debug!(id = %id, "Deleting project");

        ctx.run(async {
            let result = sqlx::query("DELETE FROM projects WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete project", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!("Project '{}' not found", id)));
            }

            Ok(())
        })
        .await
    }
}

fn row_to_project(row: &PgRow) -> Result<Project, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt_row("project", e))?;
    let space_id: uuid::Uuid = row
        .try_get("space_id")
        .map_err(|e| corrupt_row("project", e))?;
    let slug: String = row.try_get("slug").map_err(|e| corrupt_row("project", e))?;

    Ok(Project {
        id: id.into(),
        space_id: space_id.into(),
        name: row.try_get("name").map_err(|e| corrupt_row("project", e))?,
        slug: Slug::new(slug).map_err(|e| corrupt_row("project", e))?,
        description: row
            .try_get("description")
            .map_err(|e| corrupt_row("project", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt_row("project", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| corrupt_row("project", e))?,
    })
}
