//! Dashboard routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use campus_core::access::{Action, EntityKind, Link};
use campus_core::auth::Principal;
use campus_db::repositories::DashboardRepository;
use campus_shared::SchoolId;
use chrono::Datelike;

use super::SchoolFilter;
use crate::{
    AppState,
    access::Guard,
    error::ApiResult,
    extractors::ApiQuery,
    middleware::AuthUser,
};

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/monthly-data", get(monthly_data))
        .route("/dashboard/gender-data", get(gender_data))
}

/// Picks the school the figures cover and checks the caller may read it.
///
/// Admins without a `schoolId` see every school.
async fn dashboard_scope(
    state: &AppState,
    principal: &Principal,
    requested: Option<i32>,
) -> ApiResult<Option<SchoolId>> {
    let guard = Guard::new(state.db.as_ref(), principal);
    match requested.map(SchoolId).or(principal.home_school_id) {
        Some(school) => {
            guard.row(Action::Read, EntityKind::School, school.0).await?;
            Ok(Some(school))
        }
        None => {
            guard
                .under(Action::Read, EntityKind::School, Link::Platform)
                .await?;
            Ok(None)
        }
    }
}

/// GET `/dashboard/stats` - Headline counts.
async fn stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let school = dashboard_scope(&state, &principal, filter.school_id).await?;
    Ok(Json(
        DashboardRepository::new(state.db.as_ref()).stats(school).await?,
    ))
}

/// GET `/dashboard/monthly-data` - New teachers and students per month of
/// the current year.
async fn monthly_data(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let school = dashboard_scope(&state, &principal, filter.school_id).await?;
    let year = chrono::Utc::now().year();
    Ok(Json(
        DashboardRepository::new(state.db.as_ref())
            .monthly(school, year)
            .await?,
    ))
}

/// GET `/dashboard/gender-data` - Students by gender.
async fn gender_data(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<impl IntoResponse> {
    let school = dashboard_scope(&state, &principal, filter.school_id).await?;
    Ok(Json(
        DashboardRepository::new(state.db.as_ref()).gender(school).await?,
    ))
}
