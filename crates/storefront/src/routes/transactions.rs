//! Checkout, payment and transaction history handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use bookshop_core::Transaction;

use super::JsonBody;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::PaymentDetails;
use crate::state::AppState;

/// Where the checkout page sends the shopper after paying.
const AFTER_PAYMENT_REDIRECT: &str = "/cart.html";

/// Response to a successful payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub redirect: &'static str,
    pub transaction: Transaction,
}

/// Turn the caller's cart into a pending transaction.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Transaction>> {
    let transaction = state.checkout().checkout(&user_id).await?;
    let transaction_id = transaction.id.to_string();
    add_breadcrumb(
        "checkout",
        "Transaction created",
        Some(&[("transaction_id", transaction_id.as_str())]),
    );
    Ok(Json(transaction))
}

/// Pay the caller's pending transaction.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    JsonBody(payment): JsonBody<PaymentDetails>,
) -> Result<Json<PaymentResponse>> {
    let transaction = state.checkout().pay(&user_id, &payment).await?;
    Ok(Json(PaymentResponse {
        redirect: AFTER_PAYMENT_REDIRECT,
        transaction,
    }))
}

/// The caller's pending transaction.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn pending(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Transaction>> {
    Ok(Json(state.ledger().get_pending_transaction(&user_id).await?))
}

/// All of the caller's transactions, oldest first.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(state.ledger().list_transactions(&user_id).await?))
}

/// Delete the caller's most recent transaction and return it.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn delete_last(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<Transaction>> {
    Ok(Json(state.ledger().delete_most_recent(&user_id).await?))
}
