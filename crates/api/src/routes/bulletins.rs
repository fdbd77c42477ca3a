//! Notice, event and holiday routes.
//!
//! Every member of a school reads its bulletins; the school account writes
//! them.

use axum::{Router, routing::get};
use campus_core::auth::Principal;
use campus_core::validation::{self, ValidationError};
use campus_db::repositories::{BulletinInput, HolidayInput};
use serde::Deserialize;

use super::claimed_school;
use crate::AppState;

/// Creates the bulletin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notices", get(notices::list).post(notices::create))
        .route(
            "/notices/{id}",
            get(notices::get).put(notices::update).delete(notices::delete),
        )
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/{id}",
            get(events::get).put(events::update).delete(events::delete),
        )
        .route("/holidays", get(holidays::list).post(holidays::create))
        .route(
            "/holidays/{id}",
            get(holidays::get).put(holidays::update).delete(holidays::delete),
        )
}

/// Request body for creating or replacing a notice or an event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinRequest {
    /// Headline.
    pub title: Option<String>,
    /// Body text.
    pub description: Option<String>,
    /// Date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Owning school; defaults to the caller's.
    pub school_id: Option<i32>,
}

impl BulletinRequest {
    fn into_input(self, principal: &Principal) -> Result<BulletinInput, ValidationError> {
        Ok(BulletinInput {
            title: validation::required("Title", self.title.as_deref())?.to_string(),
            description: validation::required("Description", self.description.as_deref())?
                .to_string(),
            date: validation::required_date("date", self.date.as_deref())?,
            school_id: claimed_school(principal, self.school_id)?,
        })
    }
}

/// Request body for creating or replacing a holiday.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRequest {
    /// Holiday name.
    pub name: Option<String>,
    /// First day off, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day off, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Owning school; defaults to the caller's.
    pub school_id: Option<i32>,
}

impl HolidayRequest {
    fn into_input(self, principal: &Principal) -> Result<HolidayInput, ValidationError> {
        let name = validation::required("Name", self.name.as_deref())?.to_string();
        let start_date = validation::required_date("start date", self.start_date.as_deref())?;
        let end_date = validation::required_date("end date", self.end_date.as_deref())?;
        validation::date_range(start_date, end_date)?;
        Ok(HolidayInput {
            name,
            start_date,
            end_date,
            description: self.description.unwrap_or_default(),
            school_id: claimed_school(principal, self.school_id)?,
        })
    }
}

/// Generates the five handlers of one bulletin collection.
macro_rules! bulletin_handlers {
    ($module:ident, $repo:ident, $request:ident, $kind:ident, $label:literal) => {
        mod $module {
            use axum::{
                Json,
                extract::State,
                http::StatusCode,
                response::IntoResponse,
            };
            use campus_core::access::{Action, EntityKind, Link};
            use campus_db::repositories::$repo;
            use sea_orm::TransactionTrait;
            use tracing::info;

            use super::$request;
            use crate::routes::SchoolFilter;
            use crate::{
                AppState,
                access::Guard,
                error::{ApiError, ApiResult},
                extractors::{ApiJson, ApiPath, ApiQuery},
                middleware::AuthUser,
            };

            pub(super) async fn list(
                State(state): State<AppState>,
                AuthUser(principal): AuthUser,
                ApiQuery(filter): ApiQuery<SchoolFilter>,
            ) -> ApiResult<impl IntoResponse> {
                let db = state.db.as_ref();
                let school = Guard::new(db, &principal)
                    .list_scope(EntityKind::$kind, filter.school_id)
                    .await?;

                Ok(Json($repo::new(db).list(school).await?))
            }

            pub(super) async fn get(
                State(state): State<AppState>,
                AuthUser(principal): AuthUser,
                ApiPath(id): ApiPath<i32>,
            ) -> ApiResult<impl IntoResponse> {
                let db = state.db.as_ref();
                Guard::new(db, &principal)
                    .row(Action::Read, EntityKind::$kind, id)
                    .await?;

                let row = $repo::new(db)
                    .find(id)
                    .await?
                    .ok_or_else(|| ApiError::not_found(concat!($label, " not found")))?;
                Ok(Json(row))
            }

            pub(super) async fn create(
                State(state): State<AppState>,
                AuthUser(principal): AuthUser,
                ApiJson(body): ApiJson<$request>,
            ) -> ApiResult<impl IntoResponse> {
                let input = body.into_input(&principal)?;
                let school = input.school_id;

                let txn = state.db.begin().await?;
                Guard::new(&txn, &principal)
                    .under(Action::Create, EntityKind::$kind, Link::School(school))
                    .await?;
                let row = $repo::new(&txn).create(input).await?;
                txn.commit().await?;

                info!(id = row.id, school_id = %school, kind = $label, "Bulletin created");
                Ok((StatusCode::CREATED, Json(row)))
            }

            pub(super) async fn update(
                State(state): State<AppState>,
                AuthUser(principal): AuthUser,
                ApiPath(id): ApiPath<i32>,
                ApiJson(body): ApiJson<$request>,
            ) -> ApiResult<impl IntoResponse> {
                let input = body.into_input(&principal)?;

                let txn = state.db.begin().await?;
                Guard::new(&txn, &principal)
                    .relocate(EntityKind::$kind, id, Link::School(input.school_id))
                    .await?;
                let row = $repo::new(&txn).update(id, input).await?;
                txn.commit().await?;

                info!(id, kind = $label, "Bulletin updated");
                Ok(Json(row))
            }

            pub(super) async fn delete(
                State(state): State<AppState>,
                AuthUser(principal): AuthUser,
                ApiPath(id): ApiPath<i32>,
            ) -> ApiResult<StatusCode> {
                let txn = state.db.begin().await?;
                Guard::new(&txn, &principal)
                    .row(Action::Delete, EntityKind::$kind, id)
                    .await?;
                $repo::new(&txn).delete(id).await?;
                txn.commit().await?;

                info!(id, kind = $label, "Bulletin deleted");
                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

bulletin_handlers!(notices, NoticeRepository, BulletinRequest, Notice, "Notice");
bulletin_handlers!(events, EventRepository, BulletinRequest, Event, "Event");
bulletin_handlers!(holidays, HolidayRepository, HolidayRequest, Holiday, "Holiday");

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::auth::Role;
    use campus_shared::{SchoolId, UserId};

    fn school_account() -> Principal {
        Principal::new(UserId(2), Role::School, Some(SchoolId(1)))
    }

    #[test]
    fn test_holiday_end_before_start_is_rejected() {
        let body = HolidayRequest {
            name: Some("Winter".into()),
            start_date: Some("2026-01-10".into()),
            end_date: Some("2026-01-05".into()),
            description: None,
            school_id: None,
        };

        let err = body.into_input(&school_account()).unwrap_err();
        assert_eq!(err.to_string(), "End date cannot be before start date");
    }

    #[test]
    fn test_bulletin_defaults_to_home_school() {
        let body = BulletinRequest {
            title: Some("Sports day".into()),
            description: Some("Bring water".into()),
            date: Some("2026-03-01".into()),
            school_id: None,
        };

        let input = body.into_input(&school_account()).unwrap();
        assert_eq!(input.school_id, SchoolId(1));
    }

    #[test]
    fn test_admin_must_name_a_school() {
        let admin = Principal::new(UserId(1), Role::Admin, None);
        let body = BulletinRequest {
            title: Some("Term starts".into()),
            description: Some("Welcome back".into()),
            date: Some("2026-09-01".into()),
            school_id: None,
        };

        assert_eq!(
            body.into_input(&admin).unwrap_err(),
            ValidationError::Required("School ID")
        );
    }
}
