//! Classification of driver errors into domain errors

use sqlx::error::ErrorKind;

use crate::domain::DomainError;

/// Map a sqlx error raised while running `operation` (e.g. "create project")
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::RowNotFound => DomainError::not_found(format!("{}: no matching row", operation)),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");

            match db_err.kind() {
                ErrorKind::UniqueViolation => DomainError::conflict(format!(
                    "Failed to {}: duplicate value violates '{}'",
                    operation, constraint
                )),
                ErrorKind::ForeignKeyViolation => DomainError::conflict(format!(
                    "Failed to {}: referenced parent does not exist ('{}')",
                    operation, constraint
                )),
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    DomainError::conflict(format!(
                        "Failed to {}: constraint '{}' violated",
                        operation, constraint
                    ))
                }
                _ => DomainError::storage(format!("Failed to {}: {}", operation, err)),
            }
        }
        sqlx::Error::PoolTimedOut => DomainError::storage(format!(
            "Failed to {}: timed out waiting for a database connection",
            operation
        )),
        _ => DomainError::storage(format!("Failed to {}: {}", operation, err)),
    }
}

/// Map an error decoding a stored row
pub(crate) fn corrupt_row(entity: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Invalid {} row in database: {}", entity, detail))
}
