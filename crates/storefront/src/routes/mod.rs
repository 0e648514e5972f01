//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness check
//! GET    /health/ready             - Readiness check (database ping)
//!
//! # Auth
//! POST   /signup                   - Register, password is emailed
//! POST   /login                    - Exchange credentials for a bearer token
//!
//! # Cart (requires auth)
//! POST   /api/cart/add             - Append an item
//! GET    /api/cart                 - Current cart
//! POST   /api/cart/clear           - Empty the cart
//!
//! # Transactions (requires auth)
//! POST   /api/checkout             - Cart -> pending transaction
//! POST   /api/transaction/pay      - Pay the pending transaction, receipt is emailed
//! GET    /api/transaction/pending  - The pending transaction
//! DELETE /api/transaction/last     - Delete the newest transaction
//! GET    /api/transactions         - All transactions, oldest first
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod transactions;

use axum::{
    Router,
    extract::FromRequest,
    routing::{delete, get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections become `AppError::BadRequest`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Create the authenticated API router (mounted under `/api`).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_item))
        .route("/cart/clear", post(cart::clear_cart))
        .route("/checkout", post(transactions::checkout))
        .route("/transaction/pay", post(transactions::pay))
        .route("/transaction/pending", get(transactions::pending))
        .route("/transaction/last", delete(transactions::delete_last))
        .route("/transactions", get(transactions::list))
}

/// Create all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .nest("/api", api_routes())
}
