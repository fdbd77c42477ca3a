//! Error type shared by the repositories.

use campus_shared::AppError;
use sea_orm::DbErr;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// A uniqueness rule would be broken (e.g., duplicate roll number).
    #[error("{0}")]
    Conflict(String),

    /// The row is still referenced and cannot be removed.
    #[error("{0}")]
    InUse(String),

    /// A cross-reference in the input does not hold.
    #[error("{0}")]
    Invalid(String),

    /// A referenced row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Conflict(msg) => Self::Conflict(msg),
            RepoError::InUse(msg) => Self::BusinessRule(msg),
            RepoError::Invalid(msg) => Self::Validation(msg),
            RepoError::NotFound(msg) => Self::NotFound(msg),
            RepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let in_use: AppError =
            RepoError::InUse("Cannot delete class: It has associated students.".into()).into();
        assert_eq!(in_use.status_code(), 400);
        assert_eq!(in_use.error_code(), "BUSINESS_RULE_VIOLATION");

        let db: AppError = RepoError::Database(DbErr::Custom("boom".into())).into();
        assert!(db.is_server_error());
    }
}
