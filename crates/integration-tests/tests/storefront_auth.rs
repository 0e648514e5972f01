//! Integration tests for signup, login and bearer token handling.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use bookshop_integration_tests::TestApp;

// =============================================================================
// Signup Tests
// =============================================================================

#[tokio::test]
async fn test_signup_mails_password_not_response() {
    let app = TestApp::new();

    let (status, body) = app
        .request("POST", "/signup", None, Some(json!({ "email": " Reader@Shop.test " })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "reader@shop.test");
    assert!(body.get("password").is_none());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "reader@shop.test");
    assert_eq!(sent[0].subject, "Your Password");

    let password = app.mailer.password_for("reader@shop.test").unwrap();
    assert_eq!(password.len(), 10);
    assert!(!body.to_string().contains(&password));
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::new();
    app.login_new_user("reader@shop.test").await;

    let (status, body) = app
        .request("POST", "/signup", None, Some(json!({ "email": "READER@shop.test" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_signup_rejects_bad_email() {
    let app = TestApp::new();

    let (status, _) = app
        .request("POST", "/signup", None, Some(json!({ "email": "not-an-email" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

// =============================================================================
// Login Tests
// =============================================================================

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;
    assert_eq!(token.split('.').count(), 3);

    let (status, body) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "reader@shop.test");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.login_new_user("reader@shop.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/login",
            None,
            Some(json!({ "email": "reader@shop.test", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

// =============================================================================
// Bearer Token Tests
// =============================================================================

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/cart"),
        ("POST", "/api/checkout"),
        ("GET", "/api/transaction/pending"),
        ("GET", "/api/transactions"),
        ("DELETE", "/api/transaction/last"),
    ] {
        let (status, _) = app.request(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_api_rejects_forged_token() {
    let app = TestApp::new();

    let (status, body) = app
        .request("GET", "/api/cart", Some("a.b.c"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new();

    let (status, _) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
