//! Timetable routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link, Scope};
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{SubjectRepository, TimetableInput, TimetableRepository};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Deserialize;
use tracing::info;

use super::SchoolFilter;
use crate::{
    AppState,
    access::{Guard, owner_school},
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Creates the timetable routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/timetables", get(list_timetables).post(create_timetable))
        .route("/timetables/class/{class_id}", get(list_class_timetable))
        .route(
            "/timetables/{id}",
            get(get_timetable)
                .put(update_timetable)
                .delete(delete_timetable),
        )
}

/// Request body for creating or replacing a timetable entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    /// Class the period belongs to.
    pub class_id: Option<i32>,
    /// Weekday name.
    pub day: Option<String>,
    /// Period label.
    pub period: Option<String>,
    /// Subject taught.
    pub subject: Option<String>,
    /// Teacher taking the period.
    pub teacher_id: Option<i32>,
}

impl TryFrom<TimetableRequest> for TimetableInput {
    type Error = ValidationError;

    fn try_from(body: TimetableRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            class_id: validation::present("Class ID", body.class_id)?,
            day: validation::weekday(validation::required("Day", body.day.as_deref())?)?
                .to_string(),
            period: validation::required("Period", body.period.as_deref())?.to_string(),
            subject: validation::required("Subject", body.subject.as_deref())?.to_string(),
            teacher_id: body.teacher_id,
        })
    }
}

/// Fails unless the named teacher, if any, works where the class does.
async fn check_teacher<C: ConnectionTrait>(
    db: &C,
    teacher_id: Option<i32>,
    scope: &Scope,
) -> ApiResult<()> {
    if let Some(teacher_id) = teacher_id {
        SubjectRepository::new(db)
            .ensure_teacher_in_school(teacher_id, owner_school(scope)?)
            .await?;
    }
    Ok(())
}

/// GET `/timetables` - Timetable entries of a school.
async fn list_timetables(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Timetable, filter.school_id)
        .await?;

    Ok(Json(TimetableRepository::new(db).list(school).await?))
}

/// GET `/timetables/class/{class_id}` - Weekly timetable of one class.
async fn list_class_timetable(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(class_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .visible_class(EntityKind::Timetable, class_id)
        .await?;

    Ok(Json(TimetableRepository::new(db).list_by_class(class_id).await?))
}

/// GET `/timetables/{id}` - One timetable entry.
async fn get_timetable(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Timetable, id)
        .await?;

    let entry = TimetableRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Timetable entry not found"))?;
    Ok(Json(entry))
}

/// POST `/timetables` - Add a period to a class timetable.
async fn create_timetable(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TimetableRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = TimetableInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Timetable, Link::Class(input.class_id))
        .await?;
    check_teacher(&txn, input.teacher_id, &scope).await?;
    let entry = TimetableRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(timetable_id = entry.id, class_id = entry.class_id, "Timetable entry created");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT `/timetables/{id}` - Replace a timetable entry.
async fn update_timetable(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<TimetableRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = TimetableInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .relocate(EntityKind::Timetable, id, Link::Class(input.class_id))
        .await?;
    check_teacher(&txn, input.teacher_id, &scope).await?;
    let entry = TimetableRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(timetable_id = id, "Timetable entry updated");
    Ok(Json(entry))
}

/// DELETE `/timetables/{id}` - Remove a timetable entry.
async fn delete_timetable(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Timetable, id)
        .await?;
    TimetableRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(timetable_id = id, "Timetable entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
