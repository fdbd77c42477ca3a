//! Authentication middleware for protected routes.
//!
//! Resolves the bearer token into a [`Principal`]. The token carries only the
//! account id; role and school are read from storage on every request, so a
//! changed or deleted account takes effect immediately.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use campus_core::auth::Principal;
use campus_db::repositories::UserRepository;
use campus_shared::{JwtError, SchoolId, UserId};
use tracing::{debug, error};

use crate::{AppState, error::ApiError};

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Loads the account and stores its `Principal` in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ApiError::unauthorized(
            "Authorization header with Bearer token is required",
        ));
    };

    let claims = state
        .jwt_service
        .validate_token(bearer.token())
        .map_err(|e| match e {
            JwtError::Expired => ApiError::unauthorized("Token has expired"),
            _ => ApiError::unauthorized("Invalid or malformed token"),
        })?;

    let user = UserRepository::new(state.db.as_ref())
        .find_by_id(claims.user_id().0)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error during authentication");
            ApiError::from(e)
        })?;

    let Some(user) = user else {
        debug!(user_id = %claims.user_id(), "Token subject no longer exists");
        return Err(ApiError::unauthorized("Invalid or malformed token"));
    };

    let principal = Principal::new(
        UserId(user.id),
        user.role.into(),
        user.school_id.map(SchoolId),
    );
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extractor for the authenticated principal.
///
/// ```ignore
/// async fn handler(AuthUser(principal): AuthUser) -> impl IntoResponse {
///     let school = principal.home_school_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
