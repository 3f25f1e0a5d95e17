//! User endpoint integration tests
//!
//! Registration, login and presence over real HTTP.

use integration_tests::{
    assert_json, assert_status, ActiveUsersResponse, Credentials, ErrorResponse, LoginResponse,
    TestServer, UserResponse,
};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK)
        .await
        .expect("Health check failed");
}

#[tokio::test]
async fn test_register_user() {
    let server = TestServer::start().await.expect("Failed to start server");
    let credentials = Credentials::unique();

    let response = server.post("/user", &credentials).await.expect("Request failed");
    let user: UserResponse = assert_json(response, StatusCode::OK)
        .await
        .expect("Registration failed");

    assert_eq!(user.user_name, credentials.user_name);
    assert!(!user.id.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let server = TestServer::start().await.expect("Failed to start server");
    let credentials = Credentials::unique();
    server.register(&credentials).await.expect("First registration failed");

    let response = server.post("/user", &credentials).await.expect("Request failed");
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .expect("Expected duplicate rejection");

    assert_eq!(error.code, "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_blank_fields() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/user", &json!({ "userName": "   ", "password": "password123" }))
        .await
        .expect("Request failed");
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .expect("Expected validation error");

    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.message, "Empty username or password");
}

#[tokio::test]
async fn test_register_malformed_body() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/user", &json!({ "nickname": "bob" }))
        .await
        .expect("Request failed");
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .expect("Expected malformed body error");

    assert_eq!(error.code, "MALFORMED_BODY");
}

#[tokio::test]
async fn test_login_returns_chat_url() {
    let server = TestServer::start().await.expect("Failed to start server");
    let credentials = Credentials::unique();
    server.register(&credentials).await.expect("Registration failed");

    let response = server
        .post("/user/login", &credentials)
        .await
        .expect("Request failed");

    let headers = response.headers().clone();
    let body: LoginResponse = assert_json(response, StatusCode::OK)
        .await
        .expect("Login failed");

    assert_eq!(
        headers.get("x-rate-limit").and_then(|v| v.to_str().ok()),
        Some("100")
    );
    let expires = headers
        .get("x-expires-after")
        .and_then(|v| v.to_str().ok())
        .expect("Missing expiry header");
    assert!(expires.ends_with("GMT"));

    let prefix = server.chat_url("?token=");
    assert!(body.url.starts_with(&prefix), "unexpected url {}", body.url);
    assert_eq!(body.url.len() - prefix.len(), 16);
}

#[tokio::test]
async fn test_login_issues_distinct_tokens() {
    let server = TestServer::start().await.expect("Failed to start server");
    let credentials = Credentials::unique();
    server.register(&credentials).await.expect("Registration failed");

    let first = server.login(&credentials).await.expect("First login failed");
    let second = server.login(&credentials).await.expect("Second login failed");

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let server = TestServer::start().await.expect("Failed to start server");
    let credentials = Credentials::unique();
    server.register(&credentials).await.expect("Registration failed");

    let response = server
        .post("/user/login", &credentials.with_password("not-the-password"))
        .await
        .expect("Request failed");
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .expect("Expected credential rejection");

    assert_eq!(error.code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/user/login", &Credentials::unique())
        .await
        .expect("Request failed");
    let error: ErrorResponse = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .expect("Expected credential rejection");

    assert_eq!(error.code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_active_users_empty() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/user/active").await.expect("Request failed");
    let body: ActiveUsersResponse = assert_json(response, StatusCode::OK)
        .await
        .expect("Active users failed");

    assert_eq!(body.count, 0);
}
