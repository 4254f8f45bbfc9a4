//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email, UserValidationError};
use crate::domain::id::uuid_id;
use crate::domain::naming::validate_name;
use crate::domain::space::SpaceId;
use crate::domain::DomainError;

uuid_id!(
    /// User identifier
    UserId,
    "User"
);

/// Email address, trimmed and lower-cased on construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalize and validate an email address
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim().to_lowercase();
        validate_email(&normalized)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user within their space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full control including deleting the space
    Owner,
    /// Can manage members and projects
    Admin,
    #[default]
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UserValidationError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user belonging to a space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub space_id: SpaceId,
    /// Unique across all users
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserParams {
    pub space_id: SpaceId,
    pub email: Email,
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
}

impl CreateUserParams {
    pub fn new(space_id: SpaceId, email: Email, display_name: impl Into<String>) -> Self {
        Self {
            space_id,
            email,
            display_name: display_name.into(),
            role: UserRole::default(),
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("Display name", &self.display_name)?;
        Ok(())
    }
}

/// Input for replacing the mutable fields of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserParams {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
}

impl UpdateUserParams {
    /// Start from the current state of a user
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
        }
    }

    pub fn with_email(mut self, email: Email) -> Self {
        self.email = email;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("Display name", &self.display_name)?;
        Ok(())
    }
}
