// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use octofit_tracker::config::Config;
use octofit_tracker::db::{Database, FirestoreDb, MemoryDb};
use octofit_tracker::routes::create_router;
use octofit_tracker::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Admin key configured by `Config::default()`.
#[allow(dead_code)]
pub const ADMIN_KEY: &str = "test_admin_key";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore connection to the emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let db: Arc<dyn Database> = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Send one request through a clone of the router.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    admin_key: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = admin_key {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON (`Value::Null` when empty).
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request and assert on the status, returning the JSON body.
#[allow(dead_code)]
pub async fn expect_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    status: StatusCode,
) -> Value {
    let response = send(app, method, uri, body, None).await;
    assert_eq!(response.status(), status, "{} {}", method, uri);
    json_body(response).await
}

#[allow(dead_code)]
pub async fn create_team(app: &axum::Router, name: &str) -> Value {
    expect_json(
        app,
        "POST",
        "/api/teams",
        Some(serde_json::json!({ "name": name, "description": "test team" })),
        StatusCode::CREATED,
    )
    .await
}

#[allow(dead_code)]
pub async fn create_user(app: &axum::Router, name: &str, email: &str, team_id: Option<&str>) -> Value {
    expect_json(
        app,
        "POST",
        "/api/users",
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": "hunter22",
            "team_id": team_id,
        })),
        StatusCode::CREATED,
    )
    .await
}

#[allow(dead_code)]
pub async fn log_activity(app: &axum::Router, user_id: &str, activity_type: &str, calories: u32) -> Value {
    expect_json(
        app,
        "POST",
        "/api/activities",
        Some(serde_json::json!({
            "user_id": user_id,
            "activity_type": activity_type,
            "duration": 30,
            "calories": calories,
            "date": "2026-03-01T08:00:00Z",
        })),
        StatusCode::CREATED,
    )
    .await
}

/// Rebuild the leaderboard through the admin endpoint.
#[allow(dead_code)]
pub async fn refresh_leaderboard(app: &axum::Router) -> Value {
    let response = send(app, "POST", "/api/leaderboard/refresh", None, Some(ADMIN_KEY)).await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}
