//! Attendance routes.
//!
//! Students and teachers read their own records; a teacher also keeps the
//! attendance of the students of their school.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::auth::Principal;
use campus_core::status;
use campus_core::validation::{self, Either, ExclusivePair, ValidationError};
use campus_db::entities::attendance;
use campus_db::repositories::{AttendanceRepository, Attendee};
use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    access::Guard,
    error::{ApiError, ApiResult},
    extractors::{ApiJson, ApiPath},
    middleware::AuthUser,
};

/// Creates the attendance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance", post(create_attendance))
        .route(
            "/attendance/{id}",
            put(update_attendance).delete(delete_attendance),
        )
        .route("/attendance/student/{student_id}", get(list_student_attendance))
        .route("/attendance/teacher/{teacher_id}", get(list_teacher_attendance))
}

/// Request body for recording or correcting attendance.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// Student attended; exclusive with `teacher_id`.
    pub student_id: Option<i32>,
    /// Teacher attended; exclusive with `student_id`.
    pub teacher_id: Option<i32>,
    /// Day, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// `Present` or `Absent`.
    pub status: Option<String>,
}

impl AttendanceRequest {
    fn day(&self) -> Result<(NaiveDate, status::AttendanceStatus), ValidationError> {
        let date = validation::required_date("date", self.date.as_deref())?;
        let status = validation::required("Status", self.status.as_deref())
            .and_then(status::AttendanceStatus::parse)?;
        Ok((date, status))
    }

    fn attendee(&self) -> Result<Attendee, ValidationError> {
        Ok(
            match validation::exactly_one(
                ExclusivePair::StudentOrTeacher,
                self.student_id,
                self.teacher_id,
            )? {
                Either::First(id) => Attendee::Student(id),
                Either::Second(id) => Attendee::Teacher(id),
            },
        )
    }
}

const fn owner_link(attendee: Attendee) -> Link {
    match attendee {
        Attendee::Student(id) => Link::Student(id),
        Attendee::Teacher(id) => Link::Teacher(id),
    }
}

async fn list_for(
    state: &AppState,
    principal: &Principal,
    attendee: Attendee,
) -> ApiResult<Json<Vec<attendance::Model>>> {
    let db = state.db.as_ref();
    Guard::new(db, principal)
        .under(Action::Read, EntityKind::Attendance, owner_link(attendee))
        .await?;

    Ok(Json(AttendanceRepository::new(db).list_for(attendee).await?))
}

/// GET `/attendance/student/{student_id}` - A student's attendance, newest first.
async fn list_student_attendance(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(student_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    list_for(&state, &principal, Attendee::Student(student_id)).await
}

/// GET `/attendance/teacher/{teacher_id}` - A teacher's attendance, newest first.
async fn list_teacher_attendance(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(teacher_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    list_for(&state, &principal, Attendee::Teacher(teacher_id)).await
}

/// POST `/attendance` - Record one day for one person.
async fn create_attendance(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<AttendanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let attendee = body.attendee()?;
    let (date, status) = body.day()?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Attendance, owner_link(attendee))
        .await?;
    let records = AttendanceRepository::new(&txn);
    records.ensure_free(attendee, date, None).await?;
    let record = records.create(attendee, date, status.into()).await?;
    txn.commit().await?;

    info!(attendance_id = record.id, ?attendee, %date, "Attendance recorded");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT `/attendance/{id}` - Correct the date or status of a record.
async fn update_attendance(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<AttendanceRequest>,
) -> ApiResult<impl IntoResponse> {
    let (date, status) = body.day()?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Update, EntityKind::Attendance, id)
        .await?;

    let records = AttendanceRepository::new(&txn);
    let attendee = records
        .find(id)
        .await?
        .and_then(|record| record.attendee())
        .ok_or_else(|| ApiError::not_found("Attendance record not found"))?;
    records.ensure_free(attendee, date, Some(id)).await?;
    let record = records.update(id, date, status.into()).await?;
    txn.commit().await?;

    info!(attendance_id = id, "Attendance updated");
    Ok(Json(record))
}

/// DELETE `/attendance/{id}` - Delete a record.
async fn delete_attendance(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Attendance, id)
        .await?;
    AttendanceRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(attendance_id = id, "Attendance deleted");
    Ok(StatusCode::NO_CONTENT)
}
