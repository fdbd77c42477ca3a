//! Staff routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::auth::{Principal, Role};
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{StaffInput, StaffRepository, UserRepository};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::info;

use super::{SchoolFilter, claimed_school};
use crate::{
    AppState,
    access::Guard,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Creates the staff routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route(
            "/staff/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

/// Request body for creating or replacing a staff member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRequest {
    /// Full name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Employing school; defaults to the caller's.
    pub school_id: Option<i32>,
    /// Linked Staff account.
    pub user_id: Option<i32>,
}

impl StaffRequest {
    fn into_input(self, principal: &Principal) -> Result<StaffInput, ValidationError> {
        Ok(StaffInput {
            name: validation::required("Name", self.name.as_deref())?.to_string(),
            email: validation::email(validation::required("Email", self.email.as_deref())?)?
                .to_string(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            school_id: claimed_school(principal, self.school_id)?,
            user_id: self.user_id,
        })
    }
}

async fn link_account<C: sea_orm::ConnectionTrait>(db: &C, input: &StaffInput) -> ApiResult<()> {
    if let Some(user_id) = input.user_id {
        UserRepository::new(db)
            .ensure_linkable(user_id, Role::Staff, input.school_id)
            .await?;
    }
    Ok(())
}

/// GET `/staff` - Staff of a school.
async fn list_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Staff, filter.school_id)
        .await?;

    Ok(Json(StaffRepository::new(db).list(school).await?))
}

/// GET `/staff/{id}` - One staff member.
async fn get_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Staff, id)
        .await?;

    let member = StaffRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Staff not found"))?;
    Ok(Json(member))
}

/// POST `/staff` - Hire a staff member.
async fn create_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<StaffRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Staff, Link::School(input.school_id))
        .await?;
    link_account(&txn, &input).await?;
    let member = StaffRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(staff_id = member.id, school_id = member.school_id, "Staff created");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT `/staff/{id}` - Replace a staff member.
async fn update_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<StaffRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::Staff, id, Link::School(input.school_id))
        .await?;
    link_account(&txn, &input).await?;
    let member = StaffRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(staff_id = id, "Staff updated");
    Ok(Json(member))
}

/// DELETE `/staff/{id}` - Delete a staff member.
async fn delete_staff(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Staff, id)
        .await?;
    StaffRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(staff_id = id, "Staff deleted");
    Ok(StatusCode::NO_CONTENT)
}
