//! User validation utilities

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email must contain exactly one '@'")]
    MissingAt,

    #[error("Email local part cannot be empty")]
    EmptyLocalPart,

    #[error("Email domain '{0}' is invalid")]
    InvalidDomain(String),

    #[error("Email contains invalid character: '{0}'")]
    InvalidEmailCharacter(char),

    #[error("Unknown user role: '{0}'")]
    UnknownRole(String),
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

const MAX_EMAIL_LENGTH: usize = 254;

/// Validate an already normalized email address
///
/// Rules:
/// - Cannot be empty, maximum 254 characters
/// - No whitespace or control characters
/// - Exactly one '@' with a non-empty local part
/// - Domain has at least one dot and no empty labels
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if let Some(c) = email.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(UserValidationError::InvalidEmailCharacter(c));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(UserValidationError::MissingAt);
    };

    if local.is_empty() {
        return Err(UserValidationError::EmptyLocalPart);
    }

    let labels: Vec<&str> = domain.split('.').collect();

    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(UserValidationError::InvalidDomain(domain.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&email),
            Err(UserValidationError::EmailTooLong(254))
        );
    }

    #[test]
    fn test_email_at_rules() {
        assert_eq!(
            validate_email("example.com"),
            Err(UserValidationError::MissingAt)
        );
        assert_eq!(
            validate_email("a@b@example.com"),
            Err(UserValidationError::MissingAt)
        );
        assert_eq!(
            validate_email("@example.com"),
            Err(UserValidationError::EmptyLocalPart)
        );
    }

    #[test]
    fn test_email_domain_rules() {
        assert_eq!(
            validate_email("ada@localhost"),
            Err(UserValidationError::InvalidDomain("localhost".to_string()))
        );
        assert_eq!(
            validate_email("ada@example..com"),
            Err(UserValidationError::InvalidDomain("example..com".to_string()))
        );
    }

    #[test]
    fn test_email_whitespace() {
        assert_eq!(
            validate_email("ada lovelace@example.com"),
            Err(UserValidationError::InvalidEmailCharacter(' '))
        );
    }
}
