//! Space entity and parameter bundles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::uuid_id;
use crate::domain::naming::{validate_name, Slug};
use crate::domain::DomainError;

uuid_id!(
    /// Space identifier
    SpaceId,
    "Space"
);

/// Top-level tenant grouping projects and users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    /// Globally unique
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpaceParams {
    pub name: String,
    pub slug: Slug,
}

impl CreateSpaceParams {
    pub fn new(name: impl Into<String>, slug: Slug) -> Self {
        Self {
            name: name.into(),
            slug,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("Space name", &self.name)?;
        Ok(())
    }
}

/// Input for replacing the mutable fields of a space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSpaceParams {
    pub id: SpaceId,
    pub name: String,
    pub slug: Slug,
}

impl UpdateSpaceParams {
    /// Start from the current state of a space
    pub fn from_space(space: &Space) -> Self {
        Self {
            id: space.id,
            name: space.name.clone(),
            slug: space.slug.clone(),
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

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("Space name", &self.name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    #[test]
    fn test_create_params_validation() {
        assert!(CreateSpaceParams::new("Acme", slug("acme")).validate().is_ok());

        let err = CreateSpaceParams::new("  ", slug("acme"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_update_params_from_space() {
        let now = Utc::now();
        let space = Space {
            id: SpaceId::new(),
            name: "Acme".to_string(),
            slug: slug("acme"),
            created_at: now,
            updated_at: now,
        };

        let params = UpdateSpaceParams::from_space(&space).with_name("Acme Inc");

        assert_eq!(params.id, space.id);
        assert_eq!(params.name, "Acme Inc");
        assert_eq!(params.slug, space.slug);
    }
}
