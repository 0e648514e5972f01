//! Integration tests for the cart, checkout and payment flow.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use bookshop_integration_tests::TestApp;
use bookshop_storefront::config::CheckoutPolicy;

fn amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn payment() -> Value {
    json!({
        "cardNumber": "4111 1111 1111 1111",
        "expirationDate": "12/30",
        "cvv": "123",
        "name": "Ada Reader",
        "address": "1 Library Lane",
    })
}

// =============================================================================
// Full Flow
// =============================================================================

#[tokio::test]
async fn test_add_checkout_pay() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/cart/add",
            Some(&token),
            Some(json!({ "product_id": "A", "quantity": 2, "price": 5.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item added to cart");

    let (status, transaction) = app.request("POST", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transaction["status"], "pending");
    assert_eq!(transaction["user_id"], "reader@shop.test");
    assert_eq!(amount(&transaction["total_amount"]), Decimal::from(10));
    assert_eq!(transaction["items"].as_array().unwrap().len(), 1);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let (status, pending) = app
        .request("GET", "/api/transaction/pending", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["id"], transaction["id"]);

    let (status, paid) = app
        .request("POST", "/api/transaction/pay", Some(&token), Some(payment()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["redirect"], "/cart.html");
    assert_eq!(paid["transaction"]["id"], transaction["id"]);
    assert_eq!(paid["transaction"]["status"], "completed");

    let receipt = app.mailer.sent().pop().unwrap();
    assert_eq!(receipt.to, "reader@shop.test");
    assert_eq!(receipt.subject, "Your Receipt");
    let attachment = receipt.attachment.unwrap();
    let text = String::from_utf8(attachment.bytes).unwrap();
    assert!(text.contains("Customer: Ada Reader"));
    assert!(text.contains("Grand Total: $10.00"));

    let (status, _) = app
        .request("GET", "/api/transaction/pending", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let app = TestApp::new();
    let ada = app.login_new_user("ada@shop.test").await;
    let bob = app.login_new_user("bob@shop.test").await;

    app.request(
        "POST",
        "/api/cart/add",
        Some(&ada),
        Some(json!({ "product_id": "A", "quantity": 1, "price": 3 })),
    )
    .await;

    let (_, cart) = app.request("GET", "/api/cart", Some(&bob), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
    let (_, cart) = app.request("GET", "/api/cart", Some(&ada), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;
    app.request(
        "POST",
        "/api/cart/add",
        Some(&token),
        Some(json!({ "product_id": "A", "quantity": 1, "price": 3 })),
    )
    .await;

    let (status, _) = app.request("POST", "/api/cart/clear", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_add_item_rejects_bad_bodies() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    for body in [
        json!({ "product_id": "", "quantity": 1, "price": 1 }),
        json!({ "product_id": "A", "quantity": 1, "price": -1 }),
        json!({ "product_id": "A", "quantity": "two", "price": 1 }),
        json!({ "quantity": 1, "price": 1 }),
    ] {
        let (status, response) = app
            .request("POST", "/api/cart/add", Some(&token), Some(body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response["error"].is_string());
    }

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (status, _) = app.request("GET", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_pay_without_pending_is_not_found() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (status, body) = app
        .request("POST", "/api/transaction/pay", Some(&token), Some(payment()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no pending transaction");
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_second_checkout_conflicts() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (status, _) = app.request("POST", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    app.request(
        "POST",
        "/api/cart/add",
        Some(&token),
        Some(json!({ "product_id": "B", "quantity": 1, "price": 7 })),
    )
    .await;

    let (status, _) = app.request("POST", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_checkout_can_be_refused() {
    let app = TestApp::with_policy(CheckoutPolicy {
        require_non_empty_cart: true,
    });
    let token = app.login_new_user("reader@shop.test").await;

    let (status, body) = app.request("POST", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cart is empty");
}

#[tokio::test]
async fn test_empty_checkout_allowed_by_default() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (status, transaction) = app.request("POST", "/api/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&transaction["total_amount"]), Decimal::ZERO);
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_list_and_delete_last() {
    let app = TestApp::new();
    let token = app.login_new_user("reader@shop.test").await;

    let (_, first) = app.request("POST", "/api/checkout", Some(&token), None).await;
    app.request("POST", "/api/transaction/pay", Some(&token), Some(payment()))
        .await;
    let (_, second) = app.request("POST", "/api/checkout", Some(&token), None).await;

    let (status, list) = app.request("GET", "/api/transactions", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], first["id"]);
    assert_eq!(list[1]["id"], second["id"]);

    let (status, deleted) = app
        .request("DELETE", "/api/transaction/last", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], second["id"]);

    let (_, list) = app.request("GET", "/api/transactions", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    app.request("DELETE", "/api/transaction/last", Some(&token), None)
        .await;
    let (status, _) = app
        .request("DELETE", "/api/transaction/last", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
