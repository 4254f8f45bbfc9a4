//! Space domain
//!
//! Spaces are the top-level tenant. Projects and users always belong to
//! exactly one space.

mod entity;
mod repository;

pub use entity::{CreateSpaceParams, Space, SpaceId, UpdateSpaceParams};
pub use repository::SpaceRepository;
