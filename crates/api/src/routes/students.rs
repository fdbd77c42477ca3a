//! Student routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::auth::Role;
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{StudentInput, StudentRepository, UserRepository};
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

/// Creates the student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/class/{class_id}", get(list_class_students))
        .route(
            "/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// Request body for creating or replacing a student.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRequest {
    /// Full name.
    pub name: Option<String>,
    /// Roll number.
    pub roll_no: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Gender.
    pub gender: Option<String>,
    /// Class to enrol in.
    pub class_id: Option<i32>,
    /// Linked Student account.
    pub user_id: Option<i32>,
}

impl TryFrom<StudentRequest> for StudentInput {
    type Error = ValidationError;

    fn try_from(body: StudentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: validation::required("Name", body.name.as_deref())?.to_string(),
            roll_no: validation::required("Roll number", body.roll_no.as_deref())?.to_string(),
            email: validation::email(validation::required("Email", body.email.as_deref())?)?
                .to_string(),
            gender: body.gender.filter(|g| !g.trim().is_empty()),
            class_id: validation::present("Class ID", body.class_id)?,
            user_id: body.user_id,
        })
    }
}

/// Cross-reference and uniqueness checks shared by create and update.
async fn check_references<C: ConnectionTrait>(
    db: &C,
    input: &StudentInput,
    school: campus_shared::SchoolId,
    except: Option<i32>,
) -> ApiResult<()> {
    StudentRepository::new(db)
        .ensure_roll_no_free(input.class_id, &input.roll_no, except)
        .await?;
    if let Some(user_id) = input.user_id {
        UserRepository::new(db)
            .ensure_linkable(user_id, Role::Student, school)
            .await?;
    }
    Ok(())
}

/// GET `/students` - Students of a school.
async fn list_students(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Student, filter.school_id)
        .await?;

    Ok(Json(StudentRepository::new(db).list(school).await?))
}

/// GET `/students/class/{class_id}` - Students of a class the caller can see.
async fn list_class_students(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(class_id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .visible_class(EntityKind::Student, class_id)
        .await?;

    Ok(Json(StudentRepository::new(db).list_by_class(class_id).await?))
}

/// GET `/students/{id}` - One student.
async fn get_student(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Student, id)
        .await?;

    let student = StudentRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    Ok(Json(student))
}

/// POST `/students` - Enrol a student.
async fn create_student(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<StudentRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = StudentInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Student, Link::Class(input.class_id))
        .await?;
    let school = owner_school(&scope)?;
    check_references(&txn, &input, school, None).await?;

    let student = StudentRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(student_id = student.id, class_id = student.class_id, school_id = %school, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT `/students/{id}` - Replace a student.
async fn update_student(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<StudentRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = StudentInput::try_from(body)?;

    let txn = state.db.begin().await?;
    let scope = Guard::new(&txn, &principal)
        .relocate(EntityKind::Student, id, Link::Class(input.class_id))
        .await?;
    check_references(&txn, &input, owner_school(&scope)?, Some(id)).await?;

    let student = StudentRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(student_id = id, "Student updated");
    Ok(Json(student))
}

/// DELETE `/students/{id}` - Delete a student with their fees and attendance.
async fn delete_student(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Student, id)
        .await?;
    StudentRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(student_id = id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}
