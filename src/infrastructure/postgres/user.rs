//! PostgreSQL user queries

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::debug;

use super::error::{corrupt_row, map_sqlx_error};
use super::PostgresQuerier;
use crate::domain::{
    CreateUserParams, DomainError, Email, QueryContext, SpaceId, UpdateUserParams, User, UserId,
    UserRepository, UserRole,
};

#[async_trait]
impl UserRepository for PostgresQuerier {
    async fn create_user(
        &self,
        ctx: &QueryContext,
        params: CreateUserParams,
    ) -> Result<User, DomainError> {
        params.validate()?;
        debug!(space_id = %params.space_id, "Creating user");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                INSERT INTO users (space_id, email, display_name, role)
                VALUES ($1, $2, $3, $4)
                RETURNING id, space_id, email, display_name, role, created_at, updated_at
                "#,
            )
            .bind(params.space_id.as_uuid())
            .bind(params.email.as_str())
            .bind(params.display_name.as_str())
            .bind(params.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create user", e))?;

            row_to_user(&row)
        })
        .await
    }

    async fn get_user(&self, ctx: &QueryContext, id: UserId) -> Result<User, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, space_id, email, display_name, role, created_at, updated_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get user", e))?;

            match row {
                Some(row) => row_to_user(&row),
                None => Err(DomainError::not_found(format!("User '{}' not found", id))),
            }
        })
        .await
    }

    async fn get_user_by_email(
        &self,
        ctx: &QueryContext,
        email: &Email,
    ) -> Result<User, DomainError> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT id, space_id, email, display_name, role, created_at, updated_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get user by email", e))?;

            match row {
                Some(row) => row_to_user(&row),
                None => Err(DomainError::not_found(format!(
                    "User with email '{}' not found",
                    email
                ))),
            }
        })
        .await
    }

    async fn list_users_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<User>, DomainError> {
        ctx.run(async {
            let rows = sqlx::query(
                r#"
                SELECT id, space_id, email, display_name, role, created_at, updated_at
                FROM users
                WHERE space_id = $1
                ORDER BY created_at, id
                "#,
            )
            .bind(space_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list users", e))?;

            rows.iter().map(row_to_user).collect()
        })
        .await
    }

    async fn update_user(
        &self,
        ctx: &QueryContext,
        params: UpdateUserParams,
    ) -> Result<User, DomainError> {
        params.validate()?;
        debug!(id = %params.id, role = %params.role, "Updating user");

        ctx.run(async {
            let row = sqlx::query(
                r#"
                UPDATE users
                SET email = $2, display_name = $3, role = $4, updated_at = NOW()
                WHERE id = $1
                RETURNING id, space_id, email, display_name, role, created_at, updated_at
                "#,
            )
            .bind(params.id.as_uuid())
            .bind(params.email.as_str())
            .bind(params.display_name.as_str())
            .bind(params.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update user", e))?;

            match row {
                Some(row) => row_to_user(&row),
                None => Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    params.id
                ))),
            }
        })
        .await
    }

    async fn delete_user(&self, ctx: &QueryContext, id: UserId) -> Result<(), DomainError> {
        debug!(id = %id, "Deleting user");

        ctx.run(async {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete user", e))?;

            if result.rows_affected() == 0 {
                return Err(DomainError::not_found(format!("User '{}' not found", id)));
            }

            Ok(())
        })
        .await
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| corrupt_row("user", e))?;
    let space_id: uuid::Uuid = row
        .try_get("space_id")
        .map_err(|e| corrupt_row("user", e))?;
    let email: String = row.try_get("email").map_err(|e| corrupt_row("user", e))?;
    let role: String = row.try_get("role").map_err(|e| corrupt_row("user", e))?;

    Ok(User {
        id: id.into(),
        space_id: space_id.into(),
        email: Email::new(email).map_err(|e| corrupt_row("user", e))?,
        display_name: row
            .try_get("display_name")
            .map_err(|e| corrupt_row("user", e))?,
        role: role
            .parse::<UserRole>()
            .map_err(|e| corrupt_row("user", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| corrupt_row("user", e))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| corrupt_row("user", e))?,
    })
}
