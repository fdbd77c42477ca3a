//! Account management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use campus_core::access::{AccessError, Action, DenyReason, EntityKind, Link};
use campus_core::auth::{Principal, Role, hash_password, verify_password};
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{NewUser, UserChanges, UserRepository};
use campus_shared::SchoolId;
use campus_shared::auth::{ChangePasswordRequest, CurrentUserResponse, ResetPasswordRequest};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    AppState,
    access::Guard,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(current_user))
        .route("/users/reset-password", post(reset_password))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/users/{id}/change-password", put(change_password))
}

/// Request body for creating or updating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    /// Login name.
    pub username: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Role name.
    pub role: Option<String>,
    /// Home school.
    pub school_id: Option<i32>,
    /// Initial password, create only.
    pub password: Option<String>,
    /// Free-form permissions document.
    pub permissions: Option<serde_json::Value>,
}

/// Role and school an account will carry, checked against the caller's rights.
fn assignment(principal: &Principal, body: &UserRequest) -> ApiResult<(Role, Option<SchoolId>)> {
    let role: Role = validation::required("Role", body.role.as_deref())?
        .parse()
        .map_err(|_| ValidationError::InvalidRole)?;

    if !principal.role.can_assign(role) {
        return Err(AccessError::Denied(DenyReason::InsufficientRole).into());
    }

    let requested = body.school_id.map(SchoolId);
    let school = match principal.role {
        Role::School => requested.or(principal.home_school_id),
        _ => requested,
    };
    validation::school_assignment(role, school)?;

    Ok((role, school))
}

fn owner_link(school: Option<SchoolId>) -> Link {
    school.map_or(Link::Platform, Link::School)
}

/// Fails unless the caller may manage accounts with `role`.
fn ensure_manageable(principal: &Principal, role: Role) -> ApiResult<()> {
    if principal.role.can_assign(role) {
        Ok(())
    } else {
        Err(AccessError::Denied(DenyReason::InsufficientRole).into())
    }
}

/// GET `/users/me` - The caller's own account.
async fn current_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<Json<CurrentUserResponse>> {
    let user = UserRepository::new(state.db.as_ref())
        .find_by_id(principal.user_id.0)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(CurrentUserResponse {
        user_id: principal.user_id,
        username: user.username,
        role: principal.role.to_string(),
        school_id: principal.home_school_id,
    }))
}

/// GET `/users` - Accounts visible to the caller.
async fn list_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::User, None)
        .await?;

    let users = UserRepository::new(db).list(school).await?;
    Ok(Json(users))
}

/// POST `/users` - Create an account.
async fn create_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<impl IntoResponse> {
    let (role, school) = assignment(&principal, &body)?;
    let username = validation::required("Username", body.username.as_deref())?.to_string();
    let email = validation::email(validation::required("Email", body.email.as_deref())?)?.to_string();
    let password = validation::required("Password", body.password.as_deref())?;
    let password_hash = hash_password(password)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::User, owner_link(school))
        .await?;

    let users = UserRepository::new(&txn);
    users.ensure_unique(&username, &email, None).await?;
    let user = users
        .create(NewUser {
            username,
            email,
            password_hash,
            role,
            school_id: school,
            permissions: body.permissions,
        })
        .await?;
    txn.commit().await?;

    info!(user_id = user.id, role = %role, created_by = %principal.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT `/users/{id}` - Update an account.
async fn update_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<UserRequest>,
) -> ApiResult<impl IntoResponse> {
    let (role, school) = assignment(&principal, &body)?;
    let username = validation::required("Username", body.username.as_deref())?.to_string();
    let email = validation::email(validation::required("Email", body.email.as_deref())?)?.to_string();

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::User, id, owner_link(school))
        .await?;

    let users = UserRepository::new(&txn);
    let current = users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    ensure_manageable(&principal, current.role.into())?;

    users.ensure_unique(&username, &email, Some(id)).await?;
    let user = users
        .update(
            id,
            UserChanges {
                username,
                email,
                role,
                school_id: school,
                permissions: body.permissions,
            },
        )
        .await?;
    txn.commit().await?;

    info!(user_id = id, updated_by = %principal.user_id, "User updated");
    Ok(Json(user))
}

/// DELETE `/users/{id}` - Delete an account.
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::User, id)
        .await?;

    let users = UserRepository::new(&txn);
    if let Some(current) = users.find_by_id(id).await? {
        ensure_manageable(&principal, current.role.into())?;
    }
    users.delete(id).await?;
    txn.commit().await?;

    info!(user_id = id, deleted_by = %principal.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/users/reset-password` - Change the caller's own password.
async fn reset_password(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let current_password = validation::required("Current password", body.current_password.as_deref())?;
    let new_password = validation::required("New password", body.new_password.as_deref())?;

    let users = UserRepository::new(state.db.as_ref());
    let user = users
        .find_by_id(principal.user_id.0)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or malformed token"))?;

    if !verify_password(current_password, &user.password_hash)? {
        return Err(ApiError::validation("Current password is incorrect"));
    }

    users
        .set_password_hash(user.id, hash_password(new_password)?)
        .await?;

    info!(user_id = user.id, "Password reset by owner");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// PUT `/users/{id}/change-password` - Set another account's password.
async fn change_password(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_password = validation::required("New password", body.new_password.as_deref())?;
    let password_hash = hash_password(new_password)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Update, EntityKind::User, id)
        .await?;

    let users = UserRepository::new(&txn);
    if let Some(current) = users.find_by_id(id).await? {
        ensure_manageable(&principal, current.role.into())?;
    }
    users.set_password_hash(id, password_hash).await?;
    txn.commit().await?;

    info!(user_id = id, changed_by = %principal.user_id, "Password changed");
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
