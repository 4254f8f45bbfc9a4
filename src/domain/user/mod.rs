//! User domain
//!
//! Users belong to a space and are identified across the whole registry by
//! their email address.

mod entity;
mod repository;
mod validation;

pub use entity::{CreateUserParams, Email, UpdateUserParams, User, UserId, UserRole};
pub use repository::UserRepository;
pub use validation::{validate_email, UserValidationError};
