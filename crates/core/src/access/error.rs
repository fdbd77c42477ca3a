//! Access-control errors.

use campus_shared::AppError;
use thiserror::Error;

use super::kind::EntityKind;
use super::policy::DenyReason;

/// Failure to authorize an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The target, or a link in its ownership chain, does not exist.
    #[error("{kind} not found")]
    NotFound {
        /// Kind of the missing record.
        kind: EntityKind,
        /// Key of the missing record.
        id: i32,
    },

    /// The policy denies the operation.
    #[error("{0}")]
    Denied(DenyReason),

    /// The ownership lookup itself failed.
    #[error("ownership lookup failed: {0}")]
    Lookup(String),
}

impl AccessError {
    /// Returns true for `NotFound`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound { kind, .. } => Self::NotFound(format!("{kind} not found")),
            AccessError::Denied(reason) => Self::Forbidden(reason.message().to_string()),
            AccessError::Lookup(detail) => Self::Database(detail),
        }
    }
}
