//! User repository trait

use async_trait::async_trait;

use super::entity::{CreateUserParams, Email, UpdateUserParams, User, UserId};
use crate::domain::space::SpaceId;
use crate::domain::{DomainError, QueryContext};

/// Data-access operations for users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; `Conflict` when the email is taken or the space does
    /// not exist
    async fn create_user(
        &self,
        ctx: &QueryContext,
        params: CreateUserParams,
    ) -> Result<User, DomainError>;

    async fn get_user(&self, ctx: &QueryContext, id: UserId) -> Result<User, DomainError>;

    async fn get_user_by_email(&self, ctx: &QueryContext, email: &Email)
        -> Result<User, DomainError>;

    /// Users of one space, oldest first
    async fn list_users_by_space(
        &self,
        ctx: &QueryContext,
        space_id: SpaceId,
    ) -> Result<Vec<User>, DomainError>;

    async fn update_user(
        &self,
        ctx: &QueryContext,
        params: UpdateUserParams,
    ) -> Result<User, DomainError>;

    async fn delete_user(&self, ctx: &QueryContext, id: UserId) -> Result<(), DomainError>;
}
