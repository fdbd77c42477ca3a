//! Login.

use axum::{Json, Router, extract::State, routing::post};
use campus_core::auth::{Role, verify_decoy, verify_password};
use campus_db::repositories::UserRepository;
use campus_shared::auth::{LoginRequest, LoginResponse};
use campus_shared::{SchoolId, UserId};
use tracing::info;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ApiJson,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// POST /login - Authenticate with username and password.
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (
        payload.username.filter(|u| !u.is_empty()),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Username and password are required"));
    };

    let Some(user) = UserRepository::new(state.db.as_ref())
        .find_by_username(&username)
        .await?
    else {
        verify_decoy(&password);
        info!("Login attempt for unknown username");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&password, &user.password_hash)? {
        info!(user_id = user.id, "Failed login attempt - invalid password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.jwt_service.generate_access_token(UserId(user.id))?;
    let role = Role::from(user.role);
    info!(user_id = user.id, role = %role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        role: role.to_string(),
        username: user.username,
        school_id: user.school_id.map(SchoolId),
    }))
}
