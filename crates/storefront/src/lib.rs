//! Bookshop storefront library.
//!
//! Cart, checkout, payment and account endpoints over pluggable stores.
//! The binary in `main.rs` wires it to `PostgreSQL` and SMTP; tests wire it
//! to the in-memory store and a recording mailer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with its request tracing stack.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
}
