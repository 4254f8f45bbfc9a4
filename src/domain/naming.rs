//! Slugs and display names shared by spaces and projects

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur while validating slugs and names
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NamingError {
    #[error("Slug cannot be empty")]
    EmptySlug,

    #[error("Slug cannot exceed {0} characters")]
    SlugTooLong(usize),

    #[error("Slug contains invalid character: '{0}'. Only lowercase letters, digits and hyphens are allowed")]
    InvalidSlugCharacter(char),

    #[error("Slug must start and end with a letter or digit")]
    InvalidSlugFormat,

    #[error("Slug cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    #[error("{0} cannot exceed {1} characters")]
    NameTooLong(&'static str, usize),
}

impl From<NamingError> for DomainError {
    fn from(err: NamingError) -> Self {
        DomainError::validation(err.to_string())
    }
}

pub const MAX_SLUG_LENGTH: usize = 63;
pub const MAX_NAME_LENGTH: usize = 255;

/// Validate a slug
///
/// Rules:
/// - 1 to 63 characters
/// - Lowercase ASCII letters, digits and hyphens only
/// - Must start and end with a letter or digit
/// - No consecutive hyphens
pub fn validate_slug(slug: &str) -> Result<(), NamingError> {
    if slug.is_empty() {
        return Err(NamingError::EmptySlug);
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(NamingError::SlugTooLong(MAX_SLUG_LENGTH));
    }

    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if prev_hyphen {
                return Err(NamingError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_hyphen = false;
        } else {
            return Err(NamingError::InvalidSlugCharacter(c));
        }
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(NamingError::InvalidSlugFormat);
    }

    Ok(())
}

/// Validate a human-readable name; `field` names it in the error message
pub fn validate_name(field: &'static str, name: &str) -> Result<(), NamingError> {
    if name.trim().is_empty() {
        return Err(NamingError::EmptyName(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NamingError::NameTooLong(field, MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Human-readable unique key, scoped to a parent entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Create a new Slug after validation
    pub fn new(slug: impl Into<String>) -> Result<Self, NamingError> {
        let slug = slug.into();
        validate_slug(&slug)?;
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = NamingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Slug {
    type Error = NamingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
