//! Project domain
//!
//! A project lives inside a space; its slug is unique within that space.

mod entity;
mod repository;

pub use entity::{
    CreateProjectParams, GetProjectBySlugParams, Project, ProjectId, UpdateProjectParams,
    MAX_DESCRIPTION_LENGTH,
};
pub use repository::ProjectRepository;
