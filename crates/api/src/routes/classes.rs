//! Class routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::auth::Principal;
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{ClassInput, ClassRepository};
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

/// Creates the class routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/classes", get(list_classes).post(create_class))
        .route(
            "/classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}

/// Request body for creating or replacing a class.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    /// Class name.
    pub name: Option<String>,
    /// Section.
    pub section: Option<String>,
    /// Room.
    pub room: Option<String>,
    /// Owning school; defaults to the caller's.
    pub school_id: Option<i32>,
}

impl ClassRequest {
    fn into_input(self, principal: &Principal) -> Result<ClassInput, ValidationError> {
        Ok(ClassInput {
            name: validation::required("Name", self.name.as_deref())?.to_string(),
            section: validation::required("Section", self.section.as_deref())?.to_string(),
            room: self.room.filter(|r| !r.trim().is_empty()),
            school_id: claimed_school(principal, self.school_id)?,
        })
    }
}

/// GET `/classes` - Classes of a school.
async fn list_classes(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    let school = Guard::new(db, &principal)
        .list_scope(EntityKind::Class, filter.school_id)
        .await?;

    Ok(Json(ClassRepository::new(db).list(school).await?))
}

/// GET `/classes/{id}` - One class.
async fn get_class(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.as_ref();
    Guard::new(db, &principal)
        .row(Action::Read, EntityKind::Class, id)
        .await?;

    let class = ClassRepository::new(db)
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Class not found"))?;
    Ok(Json(class))
}

/// POST `/classes` - Create a class.
async fn create_class(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<ClassRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;
    let school = input.school_id;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .under(Action::Create, EntityKind::Class, Link::School(school))
        .await?;
    let class = ClassRepository::new(&txn).create(input).await?;
    txn.commit().await?;

    info!(class_id = class.id, school_id = %school, "Class created");
    Ok((StatusCode::CREATED, Json(class)))
}

/// PUT `/classes/{id}` - Replace a class.
async fn update_class(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<ClassRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.into_input(&principal)?;

    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .relocate(EntityKind::Class, id, Link::School(input.school_id))
        .await?;
    let class = ClassRepository::new(&txn).update(id, input).await?;
    txn.commit().await?;

    info!(class_id = id, "Class updated");
    Ok(Json(class))
}

/// DELETE `/classes/{id}` - Delete a class with no students.
async fn delete_class(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<StatusCode> {
    let txn = state.db.begin().await?;
    Guard::new(&txn, &principal)
        .row(Action::Delete, EntityKind::Class, id)
        .await?;
    ClassRepository::new(&txn).delete(id).await?;
    txn.commit().await?;

    info!(class_id = id, "Class deleted");
    Ok(StatusCode::NO_CONTENT)
}
