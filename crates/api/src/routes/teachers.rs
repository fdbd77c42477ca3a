//! Teacher routes.

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
use campus_db::repositories::{TeacherInput, TeacherRepository, UserRepository};
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

/// Creates the teacher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teachers", get(list_teachers).post(create_teacher))
        .route(
            "/teachers/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
}

/// Request body for creating or replacing a teacher.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRequest {
    /// Full name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Date of birth, `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    /// Employing school; defaults to the caller's.
    pub school_id: Option<i32>,
    /// Linked Teacher account.
    pub user_id: Option<i32>,
}

impl TeacherRequest {
    fn into_input(self, principal: &Principal) -> Result<TeacherInput, ValidationError> {
        let date_of_birth = match self.date_of_birth.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(validation::parse_date("date of birth", raw)?),
            _ => None,
        };

        Ok(TeacherInput {
            name: validation::required("Name", self.name.as_deref())?.to_string(),
            email: validation::email(validation::required("Email", self.email.as_deref())?)?
                .to_string(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            date_of_birth,
            school_id: claimed_school(principal, self.school_id)?,
            user_id: self.user_id,
        })
    }
}

/// GET `/teachers` - Teachers of a school.
async fn list_teachers(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Teacher, filter.school_id)
        .await?;

    Ok(Json(TeacherRepository::new(db).list(school).await?))
}

/// GET `/teachers/{id}` - One teacher.
async fn get_teacher(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Teacher, id)
        .await?;

    let teacher = TeacherRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;
    Ok(Json(teacher))
}

/// POST `/teachers` - Hire a teacher.
async fn create_teacher(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TeacherRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;
    let school = input.school_id;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Teacher, Link::School(school))
        .await?;
    if let Some(user_id) = input.user_id {
        UserRepository::new(&txn)
            .ensure_linkable(user_id, Role::Teacher, school)
            .await?;
    }
    let teacher = TeacherRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(teacher_id = teacher.id, school_id = %school, "Teacher created");
    Ok((StatusCode::CREATED, Json(teacher)))
}

/// PUT `/teachers/{id}` - Replace a teacher.
async fn update_teacher(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<TeacherRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;
    let school = input.school_id;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::Teacher, id, Link::School(school))
        .await?;
    if let Some(user_id) = input.user_id {
        UserRepository::new(&txn)
            .ensure_linkable(user_id, Role::Teacher, school)
            .await?;
    }
    let teacher = TeacherRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(teacher_id = id, "Teacher updated");
    Ok(Json(teacher))
}

/// DELETE `/teachers/{id}` - Delete a teacher who teaches no subject.
async fn delete_teacher(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Teacher, id)
        .await?;
    TeacherRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(teacher_id = id, "Teacher deleted");
    Ok(StatusCode::NO_CONTENT)
}
