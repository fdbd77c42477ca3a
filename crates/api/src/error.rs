//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{"error": <code>, "message": <text>}` with the status of the wrapped
//! [`AppError`]. Server-side failures are logged and reported opaquely.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_core::access::AccessError;
use campus_core::auth::PasswordError;
use campus_core::validation::ValidationError;
use campus_db::RepoError;
use campus_shared::{AppError, JwtError};
use sea_orm::DbErr;
use serde::Serialize;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Wire shape of an error.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// 401 with `message`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }

    /// 404 with `message`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(AppError::NotFound(message.into()))
    }

    /// 400 with `message`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// 403 with `message`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(AppError::Forbidden(message.into()))
    }

    /// Returns the wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if err.is_server_error() {
            error!(error = %err, "Request failed");
            "An internal error occurred".to_string()
        } else {
            err.detail().to_string()
        };

        let body = ErrorBody {
            error: err.error_code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::access::{DenyReason, EntityKind};
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[rstest]
    #[case(AccessError::NotFound { kind: EntityKind::Class, id: 3 }, StatusCode::NOT_FOUND, "Class not found")]
    #[case(AccessError::Denied(DenyReason::CrossTenant), StatusCode::FORBIDDEN, "You can only access records of your own school")]
    #[tokio::test]
    async fn test_access_errors_render(
        #[case] err: AccessError,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let (got, body) = render(err.into()).await;
        assert_eq!(got, status);
        assert_eq!(body["message"], message);
    }

    #[tokio::test]
    async fn test_server_errors_are_opaque() {
        let (status, body) =
            render(DbErr::Custom("relation \"fees\" does not exist".into()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_business_rule_is_bad_request() {
        let err = RepoError::InUse("Cannot delete class: It has associated students.".into());
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BUSINESS_RULE_VIOLATION");
    }
}
