//! PostgreSQL API key queries

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

use super::error::{corrupt_row, map_sqlx_error};
use super::PostgresQuerier;
use crate::domain::{
    ApiKey, ApiKeyId, ApiKeyRepository, CreateApiKeyParams, DomainError, ProjectId, QueryContext,
};

#[async_trait]
impl ApiKeyRepository for PostgresQuerier {
    async fn create_api_key(
        &self,
        ctx: &QueryContext,
        params: CreateApiKeyParams,
    ) -> Result<ApiKey, DomainError> {
        params.validate()?;
        debug!(project_id = %params.project_id, prefix = %params.key_prefix, "Creating API key");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                INSERT INTO api_keys (project_id, name, key_prefix, key_hash)
                VALUES ($1, $2, $3, $4)
                RETURNING id, project_id, name, key_prefix, key_hash, last_used_at, created_at
                "#,
            )
            .bind(params.project_id.as_uuid())
            .bind(params.name.as_str())
            .bind(params.key_prefix.as_str())
            .bind(params.key_hash.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create API key", e))?;

            row_to_api_key(&row)
        })
        .await
    }

    async fn get_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, project_id, name, key_prefix, key_hash, last_used_at, created_at
                FROM api_keys
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get API key", e))?;

            match row {
                Some(row) => row_to_api_key(&row),
                None => Err(DomainError::not_found(format!("API key '{}' not found", id))),
            }
        })
        .await
    }

    async fn get_api_key_by_hash(
        &self,
        ctx: &QueryContext,
        key_hash: &str,
    ) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, project_id, name, key_prefix, key_hash, last_used_at, created_at
                FROM api_keys
                WHERE key_hash = $1
                "#,
            )
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get API key by hash", e))?;

            match row {
                Some(row) => row_to_api_key(&row),
                None => Err(DomainError::not_found("API key not found")),
            }
        })
        .await
    }

    async fn get_api_key_by_prefix(
        &self,
        ctx: &QueryContext,
        key_prefix: &str,
    ) -> Result<ApiKey, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, project_id, name, key_prefix, key_hash, last_used_at, created_at
                FROM api_keys
                WHERE key_prefix = $1
                "#,
            )
            .bind(key_prefix)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get API key by prefix", e))?;

            match row {
                Some(row) => row_to_api_key(&row),
                None => Err(DomainError::not_found(format!(
                    "API key with prefix '{}' not found",
                    key_prefix
                ))),
            }
        })
        .await
    }

    async fn list_api_keys_by_project(
        &self,
        ctx: &QueryContext,
        project_id: ProjectId,
    ) -> Result<Vec<ApiKey>, DomainError> {
        ctx.run(async {
            let rows = sqlx::query(
                r#"
                SELECT id, project_id, name, key_prefix, key_hash, last_used_at, created_at
                FROM api_keys
                WHERE project_id = $1
                ORDER BY created_at, id
                "#,
            )
            .bind(project_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list API keys", e))?;

            rows.iter().map(row_to_api_key).collect()
        })
        .await
    }

    async fn update_api_key_last_used(
        &self,
        ctx: &QueryContext,
        id: ApiKeyId,
    ) -> Result<(), DomainError> {
        ctx.run(async {
            let result = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("record API key usage", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!("API key '{}' not found", id)));
            }

            Ok(())
        })
        .await
    }

    async fn delete_api_key(&self, ctx: &QueryContext, id: ApiKeyId) -> Result<(), DomainError> {
        debug!(id = %id, "Deleting API key");

        ctx.run(async {
            let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete API key", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!("API key '{}' not found", id)));
            }

            Ok(())
        })
        .await
    }
}

fn row_to_api_key(row: &PgRow) -> Result<ApiKey, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt_row("API key", e))?;
    let project_id: uuid::Uuid = row
        .try_get("project_id")
        .map_err(|e| corrupt_row("API key", e))?;

    Ok(ApiKey {
        id: id.into(),
        project_id: project_id.into(),
        name: row.try_get("name").map_err(|e| corrupt_row("API key", e))?,
        key_prefix: row
            .try_get("key_prefix")
            .map_err(|e| corrupt_row("API key", e))?,
        key_hash: row
            .try_get("key_hash")
            .map_err(|e| corrupt_row("API key", e))?,
        last_used_at: row
            .try_get("last_used_at")
            .map_err(|e| corrupt_row("API key", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt_row("API key", e))?,
    })
}
