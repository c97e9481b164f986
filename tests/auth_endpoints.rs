//! Integration tests for registration, login and token checks.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{TimeDelta, Utc};
use rstest::rstest;
use serde_json::json;

use common::{create_test_app, raw_request, request, send, test_keys};
use task_notification_api::domain::{User, UserId};

async fn register(
    app: &axum::Router,
    username: &str,
    password: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"username": username, "password": password})),
        ),
    )
    .await
}

async fn login(
    app: &axum::Router,
    username: &str,
    password: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"username": username, "password": password})),
        ),
    )
    .await
}

#[rstest]
#[tokio::test]
async fn test_register_returns_public_fields_only() {
    let (app, _) = create_test_app();

    let (status, body) = register(&app, "ada", "lovelace").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ada");
    assert!(body["id"].is_string());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[rstest]
#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let (app, _) = create_test_app();
    register(&app, "ada", "one").await;

    let (status, body) = register(&app, "ada", "two").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[rstest]
#[case(json!({"username": "ada"}), "password")]
#[case(json!({"password": "pw"}), "username")]
#[tokio::test]
async fn test_register_requires_both_fields(#[case] body: serde_json::Value, #[case] field: &str) {
    let (app, _) = create_test_app();

    let (status, error) = send(
        &app,
        request(Method::POST, "/auth/register", None, Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"][0]["field"], field);
}

#[rstest]
#[case("/auth/register", r#"{"username":5,"password":"pw"}"#, "username")]
#[case("/api/auth/login", r#"{"username":"ada","password":["pw"]}"#, "password")]
#[case("/auth/login", r#"{"username":"ada","#, "body")]
#[tokio::test]
async fn test_credentials_with_wrong_shape_are_validation_errors(
    #[case] uri: &str,
    #[case] body: &str,
    #[case] field: &str,
) {
    let (app, _) = create_test_app();

    let (status, error) = send(&app, raw_request(Method::POST, uri, None, body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert_eq!(error["details"][0]["field"], field);
}

#[rstest]
#[tokio::test]
async fn test_login_wrong_password_issues_no_token() {
    let (app, _) = create_test_app();
    register(&app, "ada", "lovelace").await;

    let (status, body) = login(&app, "ada", "babbage").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
}

#[rstest]
#[tokio::test]
async fn test_login_unknown_user_is_unauthorized() {
    let (app, _) = create_test_app();

    let (status, _) = login(&app, "nobody", "pw").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn test_login_token_lasts_one_hour_and_opens_protected_routes() {
    let (app, _) = create_test_app();
    let (_, user) = register(&app, "ada", "lovelace").await;

    let (status, body) = login(&app, "ada", "lovelace").await;

    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    let claims = test_keys().verify(token).unwrap();
    assert_eq!(claims.exp - claims.iat, 3600);
    assert_eq!(claims.sub, user["id"].as_str().unwrap());
    assert_eq!(claims.username, "ada");

    let (status, _) = send(&app, request(Method::GET, "/tasks", Some(token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, _) = create_test_app();
    let user = User::new(UserId::generate(), "ada", "unused");
    let expired = test_keys()
        .issue(&user, Utc::now() - TimeDelta::hours(2))
        .unwrap();

    let (status, body) = send(
        &app,
        request(Method::GET, "/tasks", Some(&expired.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[rstest]
#[case("Token abc")]
#[case("Bearer")]
#[case("bearer abc")]
#[tokio::test]
async fn test_malformed_authorization_header_is_rejected(#[case] header: &str) {
    let (app, _) = create_test_app();
    let request = axum::http::Request::builder()
        .uri("/tasks")
        .header(axum::http::header::AUTHORIZATION, header)
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
