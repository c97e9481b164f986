//! Common test helpers for integration tests.
//!
//! # Note
//!
//! Each integration test file is compiled as a separate crate, so helpers
//! used by only some of them would otherwise trigger dead code warnings.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use task_notification_api::api::{AppState, build_router};
use task_notification_api::auth::TokenKeys;
use task_notification_api::domain::{User, UserId};
use task_notification_api::infrastructure::{InMemoryTaskRepository, InMemoryUserRepository};
use task_notification_api::notification::EventBroadcaster;

pub const TEST_SECRET: &str = "integration-test-secret";

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` backed by empty in-memory stores.
pub fn create_test_app_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
        &SecretString::from(TEST_SECRET),
        EventBroadcaster::new(16),
    )
}

/// Creates a router over a fresh state and returns both.
pub fn create_test_app() -> (Router, AppState) {
    let state = create_test_app_state();
    (build_router(state.clone()), state)
}

/// Signing keys matching [`create_test_app_state`].
pub fn test_keys() -> TokenKeys {
    TokenKeys::new(&SecretString::from(TEST_SECRET))
}

/// Issues a valid token without going through registration.
pub fn test_token() -> String {
    let user = User::new(UserId::generate(), "tester", "unused");
    test_keys()
        .issue(&user, Utc::now())
        .expect("token signing should succeed")
        .token
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Builds a request with an optional bearer token and optional JSON body.
pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    match body {
        Some(body) => raw_request(method, uri, token, &body.to_string()),
        None => authorized(method, uri, token)
            .body(Body::empty())
            .expect("request should build"),
    }
}

/// Builds a JSON request whose body is sent verbatim, valid or not.
pub fn raw_request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    authorized(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("request should build")
}

fn authorized(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// Sends `request` through `app` and returns the status and JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();

    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, body)
}

/// Builds a task creation body.
pub fn task_body(title: &str, due_date: &str, due_time: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "dueDate": due_date,
        "dueTime": due_time,
        "priority": "High",
    })
}

/// Creates a task through the API and returns its JSON.
pub async fn create_task(
    app: &Router,
    token: &str,
    title: &str,
    due_date: &str,
    due_time: &str,
) -> Value {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/tasks",
            Some(token),
            Some(task_body(title, due_date, due_time)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body
}
