//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod accounts;
pub mod attendance;
pub mod auth;
pub mod bulletins;
pub mod classes;
pub mod dashboard;
pub mod health;
pub mod schools;
pub mod staff;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod timetables;
pub mod users;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(schools::routes())
        .merge(classes::routes())
        .merge(students::routes())
        .merge(teachers::routes())
        .merge(staff::routes())
        .merge(subjects::routes())
        .merge(timetables::routes())
        .merge(attendance::routes())
        .merge(accounts::routes())
        .merge(bulletins::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// Query string accepted by school-filtered listings.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFilter {
    /// School to list; see [`crate::access::Guard::list_scope`].
    pub school_id: Option<i32>,
}

/// School a new row is claimed for: the body's, else the caller's own.
///
/// The claim is only a target; the `Guard` still decides whether the caller
/// may write there.
pub(crate) fn claimed_school(
    principal: &campus_core::auth::Principal,
    requested: Option<i32>,
) -> Result<campus_shared::SchoolId, campus_core::validation::ValidationError> {
    requested
        .map(campus_shared::SchoolId)
        .or(principal.home_school_id)
        .ok_or(campus_core::validation::ValidationError::Required("School ID"))
}
