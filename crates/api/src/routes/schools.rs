//! School registry routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{SchoolInput, SchoolRepository};
use serde::Deserialize;
use sea_orm::TransactionTrait;
use tracing::info;

use crate::{
    AppState,
    access::Guard,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the school routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schools", get(list_schools).post(create_school))
        .route("/schools/names", get(list_school_names))
        .route(
            "/schools/{id}",
            get(get_school).put(update_school).delete(delete_school),
        )
}

/// Request body for creating or replacing a school.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRequest {
    /// School name.
    pub name: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact phone or person.
    pub contact: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

impl TryFrom<SchoolRequest> for SchoolInput {
    type Error = ValidationError;

    fn try_from(body: SchoolRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: validation::required("Name", body.name.as_deref())?.to_string(),
            address: validation::required("Address", body.address.as_deref())?.to_string(),
            contact: validation::required("Contact", body.contact.as_deref())?.to_string(),
            email: validation::email(validation::required("Email", body.email.as_deref())?)?
                .to_string(),
        })
    }
}

/// GET `/schools` - Every school for admins, the caller's own otherwise.
async fn list_schools(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let only = Guard::new(db, &principal)
        .list_scope(EntityKind::School, None)
        .await?;

    let schools = SchoolRepository::new(db).list(only.map(|s| s.0)).await?;
    Ok(Json(schools))
}

/// GET `/schools/names` - Id and name of every school.
async fn list_school_names(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .under(Action::Read, EntityKind::School, Link::Platform)
        .await?;

    Ok(Json(SchoolRepository::new(db).list_names().await?))
}

/// GET `/schools/{id}` - One school.
async fn get_school(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::School, id)
        .await?;

    let school = SchoolRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("School not found"))?;
    Ok(Json(school))
}

/// POST `/schools` - Register a school.
async fn create_school(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<SchoolRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = SchoolInput::try_from(body)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::School, Link::Platform)
        .await?;
    let school = SchoolRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(school_id = school.id, "School created");
    Ok((StatusCode::CREATED, Json(school)))
}

/// PUT `/schools/{id}` - Replace a school's details.
async fn update_school(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<SchoolRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = SchoolInput::try_from(body)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Update, EntityKind::School, id)
        .await?;
    let school = SchoolRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(school_id = id, "School updated");
    Ok(Json(school))
}

/// DELETE `/schools/{id}` - Delete a school and everything it owns.
async fn delete_school(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::School, id)
        .await?;
    SchoolRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(school_id = id, "School deleted");
    Ok(StatusCode::NO_CONTENT)
}
