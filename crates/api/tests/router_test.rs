//! Router-level tests against a mock database.
//!
//! Each test queues exactly the rows its request reads. A request that
//! reached a write would find the queue empty and fail with a 500.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use campus_api::{AppState, create_router};
use campus_core::validation::Limits;
use campus_db::entities::{sea_orm_active_enums::UserRole, users};
use campus_shared::{JwtConfig, JwtService, UserId};
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use serde_json::{Value as Json, json};
use tower::ServiceExt;

fn jwt() -> JwtService {
    JwtService::new(JwtConfig::default())
}

fn app(db: DatabaseConnection) -> Router {
    create_router(AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt()),
        limits: Limits::default(),
    })
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn school_account(id: i32, school_id: i32) -> users::Model {
    users::Model {
        id,
        username: format!("school{school_id}"),
        email: format!("school{school_id}@example.com"),
        password_hash: String::new(),
        role: UserRole::School,
        school_id: Some(school_id),
        permissions: None,
        created_at: chrono::Utc::now().into(),
    }
}

fn row<const N: usize>(pairs: [(&'static str, Value); N]) -> BTreeMap<&'static str, Value> {
    BTreeMap::from(pairs)
}

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap()
}

fn bearer(user_id: i32) -> String {
    let token = jwt().generate_access_token(UserId(user_id)).unwrap();
    format!("Bearer {token}")
}

fn post(uri: &str, auth: Option<&str>, body: &Json) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Json) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health_is_public() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(empty_db()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/classes")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(empty_db()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_token_is_unauthorized() {
    let request = Request::builder()
        .uri("/api/classes")
        .header(AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(empty_db()), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or malformed token");
}

#[tokio::test]
async fn test_token_of_deleted_user_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();
    let request = Request::builder()
        .uri("/api/users/me")
        .header(AUTHORIZATION, bearer(42))
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app(db), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let (status, body) = send(
        app(empty_db()),
        post("/api/login", None, &json!({ "username": "oak" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username and password are required");
}

#[tokio::test]
async fn test_login_with_unknown_username_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<users::Model>::new()])
        .into_connection();

    let (status, body) = send(
        app(db),
        post("/api/login", None, &json!({ "username": "ghost", "password": "guess" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_school_cannot_create_class_in_another_school() {
    let school_two = row([("id", Value::Int(Some(2)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .append_query_results([vec![school_two]])
        .into_connection();
    let auth = bearer(10);

    let (status, body) = send(
        app(db),
        post(
            "/api/classes",
            Some(&auth),
            &json!({ "name": "5", "section": "A", "schoolId": 2 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_class_in_missing_school_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let auth = bearer(10);

    let (status, _) = send(
        app(db),
        post(
            "/api/classes",
            Some(&auth),
            &json!({ "name": "5", "section": "A", "schoolId": 99 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_holiday_ending_before_it_starts_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .into_connection();
    let auth = bearer(10);

    let (status, body) = send(
        app(db),
        post(
            "/api/holidays",
            Some(&auth),
            &json!({
                "name": "Summer break",
                "startDate": "2025-06-10",
                "endDate": "2025-06-01",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date cannot be before start date");
}

#[tokio::test]
async fn test_attendance_needs_exactly_one_person() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .into_connection();
    let auth = bearer(10);

    let (status, body) = send(
        app(db),
        post(
            "/api/attendance",
            Some(&auth),
            &json!({ "studentId": 1, "teacherId": 2, "date": "2026-03-02", "status": "Present" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Provide either a student or a teacher, not both");
}

#[tokio::test]
async fn test_school_cannot_schedule_class_of_another_school() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .append_query_results([vec![row([("school_id", Value::Int(Some(2)))])]])
        .into_connection();
    let auth = bearer(10);

    let (status, body) = send(
        app(db),
        post(
            "/api/timetables",
            Some(&auth),
            &json!({ "classId": 5, "day": "Monday", "period": "1", "subject": "Maths" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[rstest]
#[case("/api/students/class/5")]
#[case("/api/subjects/class/5")]
#[case("/api/timetables/class/5")]
#[tokio::test]
async fn test_class_of_another_school_is_not_found(#[case] uri: &str) {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .append_query_results([vec![row([("school_id", Value::Int(Some(2)))])]])
        .into_connection();

    let (status, body) = send(app(db), get(uri, &bearer(10))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Class not found");
}

#[tokio::test]
async fn test_class_roster_of_own_school_is_listed() {
    let ana = row([
        ("id", Value::Int(Some(1))),
        ("name", Value::from("Ana")),
        ("roll_no", Value::from("1")),
        ("email", Value::from("ana@oak.example")),
        ("gender", Value::from("Female")),
        ("class_id", Value::Int(Some(5))),
        ("user_id", Value::Int(None)),
        ("created_at", Value::from(chrono::Utc::now().fixed_offset())),
        ("class_name", Value::from("5")),
    ]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![school_account(10, 1)]])
        .append_query_results([vec![row([("school_id", Value::Int(Some(1)))])]])
        .append_query_results([vec![ana]])
        .into_connection();

    let (status, body) = send(app(db), get("/api/students/class/5", &bearer(10))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["Name"], "Ana");
    assert_eq!(body[0]["ClassName"], "5");
}
