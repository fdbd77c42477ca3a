//! Subject routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{SubjectInput, SubjectRepository};
use sea_orm::TransactionTrait;
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

/// Creates the subject routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/class/{class_id}", get(list_class_subjects))
        .route(
            "/subjects/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
}

/// Request body for creating or replacing a subject.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRequest {
    /// Class the subject is taught in.
    pub class_id: Option<i32>,
    /// Subject name.
    pub name: Option<String>,
    /// Teacher of the subject.
    pub teacher_id: Option<i32>,
    /// Weekly periods.
    pub periods_per_week: Option<i32>,
}

impl TryFrom<SubjectRequest> for SubjectInput {
    type Error = ValidationError;

    fn try_from(body: SubjectRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            class_id: validation::present("Class ID", body.class_id)?,
            name: validation::required("Name", body.name.as_deref())?.to_string(),
            teacher_id: validation::present("Teacher ID", body.teacher_id)?,
            periods_per_week: validation::periods_per_week(validation::present(
                "Periods per week",
                body.periods_per_week,
            )?)?,
        })
    }
}

/// GET `/subjects` - Subjects of a school.
async fn list_subjects(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Subject, filter.school_id)
        .await?;

    Ok(Json(SubjectRepository::new(db).list(school).await?))
}

/// GET `/subjects/class/{class_id}` - Subjects of a class the caller can see.
async fn list_class_subjects(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(class_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .visible_class(EntityKind::Subject, class_id)
        .await?;

    Ok(Json(SubjectRepository::new(db).list_by_class(class_id).await?))
}

/// GET `/subjects/{id}` - One subject.
async fn get_subject(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Subject, id)
        .await?;

    let subject = SubjectRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subject not found"))?;
    Ok(Json(subject))
}

/// POST `/subjects` - Add a subject to a class.
async fn create_subject(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<SubjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = SubjectInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Subject, Link::Class(input.class_id))
        .await?;
    let subjects = SubjectRepository::new(&txn);
    subjects
        .ensure_teacher_in_school(input.teacher_id, owner_school(&scope)?)
        .await?;
    let subject = subjects.create(input).await?;
    txn.commit().await?;

    info!(subject_id = subject.id, class_id = subject.class_id, "Subject created");
    Ok((StatusCode::CREATED, Json(subject)))
}

/// PUT `/subjects/{id}` - Replace a subject.
async fn update_subject(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<SubjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = SubjectInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .relocate(EntityKind::Subject, id, Link::Class(input.class_id))
        .await?;
    let subjects = SubjectRepository::new(&txn);
    subjects
        .ensure_teacher_in_school(input.teacher_id, owner_school(&scope)?)
        .await?;
    let subject = subjects.update(id, input).await?;
    txn.commit().await?;

    info!(subject_id = id, "Subject updated");
    Ok(Json(subject))
}

/// DELETE `/subjects/{id}` - Delete a subject.
async fn delete_subject(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Subject, id)
        .await?;
    SubjectRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(subject_id = id, "Subject deleted");
    Ok(StatusCode::NO_CONTENT)
}
