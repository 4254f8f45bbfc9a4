//! Project entity and parameter bundles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::uuid_id;
use crate::domain::naming::{validate_name, Slug};
use crate::domain::space::SpaceId;
use crate::domain::DomainError;

uuid_id!(
    /// Project identifier
    ProjectId,
    "Project"
);

pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// A project owned by exactly one space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub space_id: SpaceId,
    pub name: String,
    /// Unique within `space_id`
    pub slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectParams {
    pub space_id: SpaceId,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateProjectParams {
    pub fn new(space_id: SpaceId, name: impl Into<String>, slug: Slug) -> Self {
        Self {
            space_id,
            name: name.into(),
            slug,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_project_fields(&self.name, self.description.as_deref())
    }
}

/// Lookup key for a project within its space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetProjectBySlugParams {
    pub space_id: SpaceId,
    pub slug: Slug,
}

impl GetProjectBySlugParams {
    pub fn new(space_id: SpaceId, slug: Slug) -> Self {
        Self { space_id, slug }
    }
}

/// Input for replacing the mutable fields of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectParams {
    pub id: ProjectId,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateProjectParams {
    /// Start from the current state of a project
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            slug: project.slug.clone(),
            description: project.description.clone(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = slug;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_project_fields(&self.name, self.description.as_deref())
    }
}

fn validate_project_fields(name: &str, description: Option<&str>) -> Result<(), DomainError> {
    validate_name("Project name", name)?;

    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
        return Err(DomainError::validation(format!(
            "Project description cannot exceed {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    #[test]
    fn test_create_params() {
        let space_id = SpaceId::new();
        let params = CreateProjectParams::new(space_id, "Web", slug("web"))
            .with_description("Public website");

        assert_eq!(params.space_id, space_id);
        assert_eq!(params.description.as_deref(), Some("Public website"));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_description_too_long() {
        let params = CreateProjectParams::new(SpaceId::new(), "Web", slug("web"))
            .with_description("d".repeat(MAX_DESCRIPTION_LENGTH + 1));

        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_multibyte_description_within_limit() {
        let params = CreateProjectParams::new(SpaceId::new(), "Café", slug("cafe"))
            .with_description("ü".repeat(MAX_DESCRIPTION_LENGTH));

        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let params = UpdateProjectParams {
            id: ProjectId::new(),
            name: String::new(),
            slug: slug("web"),
            description: None,
        };

        assert!(matches!(
            params.validate(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_create_params_deserialize_without_description() {
        let space_id = SpaceId::new();
        let json = format!(
            r#"{{"space_id":"{}","name":"Web","slug":"web"}}"#,
            space_id
        );

        let params: CreateProjectParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params.space_id, space_id);
        assert!(params.description.is_none());
    }
}
