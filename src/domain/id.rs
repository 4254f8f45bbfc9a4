//! Opaque UUID identifiers for stored entities

/// Declare a UUID-backed identifier newtype.
///
/// Identifiers are generated by the store; parsing from text rejects anything
/// that is not a well-formed UUID.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new random identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Parse an identifier from its textual form
            pub fn parse(value: &str) -> Result<Self, $crate::domain::DomainError> {
                uuid::Uuid::parse_str(value.trim()).map(Self).map_err(|e| {
                    $crate::domain::DomainError::invalid_id(format!(
                        "{} ID '{}' is not a valid UUID: {}",
                        $label, value, e
                    ))
                })
            }

            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_id;
