//! API Key entity and related types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::id::uuid_id;
use crate::domain::naming::validate_name;
use crate::domain::project::ProjectId;
use crate::domain::DomainError;

uuid_id!(
    /// API key identifier
    ApiKeyId,
    "API key"
);

/// A hashed API key belonging to a project
///
/// The plaintext secret is never stored. `key_prefix` identifies the key during
/// authentication and `key_hash` verifies it; both are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub project_id: ProjectId,
    pub name: String,
    pub key_prefix: String,
    /// Never exposed in serialization
    #[serde(skip_serializing)]
    pub key_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Check whether the key has ever been used
    pub fn has_been_used(&self) -> bool {
        self.last_used_at.is_some()
    }
}

/// Input for storing a newly issued API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateApiKeyParams {
    pub project_id: ProjectId,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
}

impl CreateApiKeyParams {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name("API key name", &self.name)?;

        if self.key_prefix.is_empty() {
            return Err(DomainError::validation("API key prefix cannot be empty"));
        }

        if self.key_hash.is_empty() {
            return Err(DomainError::validation("API key hash cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateApiKeyParams {
        CreateApiKeyParams {
            project_id: ProjectId::new(),
            name: "CI".to_string(),
            key_prefix: "tk_test_abcdefgh".to_string(),
            key_hash: "sha256$xyz".to_string(),
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(params().validate().is_ok());

        let mut missing_prefix = params();
        missing_prefix.key_prefix.clear();
        assert!(missing_prefix.validate().is_err());

        let mut missing_hash = params();
        missing_hash.key_hash.clear();
        assert!(missing_hash.validate().is_err());

        let mut blank_name = params();
        blank_name.name = "  ".to_string();
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_serialization_excludes_hash() {
        let key = ApiKey {
            id: ApiKeyId::new(),
            project_id: ProjectId::new(),
            name: "CI".to_string(),
            key_prefix: "tk_test_abcdefgh".to_string(),
            key_hash: "sha256$secret-hash".to_string(),
            last_used_at: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&key).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("key_hash"));
        assert!(!json.contains("last_used_at"));
        assert!(!key.has_been_used());
    }
}
