//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for every school entity
//! - Authentication middleware resolving the caller's `Principal`
//! - The `Guard` tying each request to the access policy
//! - Request extractors and JSON error responses

pub mod access;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::{Router, http::header::AUTHORIZATION};
use campus_core::validation::Limits;
use campus_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::{iter::once, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Bounds for monetary input.
    pub limits: Limits,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
