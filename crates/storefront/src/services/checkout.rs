//! Checkout and payment orchestration.
//!
//! ```text
//! [no pending] --checkout--> [pending transaction, cart cleared]
//! [pending]    --pay-------> [completed, receipt mailed]
//! ```
//!
//! Neither flow is atomic across stores. A failed cart clear after checkout
//! is logged and left alone; a failed receipt after payment is reported but
//! the completed status stays.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use bookshop_core::{Transaction, UserId, pricing};

use super::cart::{CartError, CartService};
use super::email::{EmailError, Mailer, OutgoingMail};
use super::ledger::{LedgerError, TransactionLedger};
use super::receipt::{ReceiptError, ReceiptRenderer};
use crate::config::CheckoutPolicy;
use crate::models::PaymentDetails;

/// Errors that can occur during checkout or payment.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Reading the cart failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout of an empty cart while the policy forbids it.
    #[error("cart is empty")]
    EmptyCart,

    /// The pending transaction could not be recorded; the cart is untouched.
    #[error("failed to create transaction: {0}")]
    TransactionCreateFailed(#[source] LedgerError),

    /// Pay was called without a pending transaction.
    #[error("no pending transaction")]
    NoPendingTransaction,

    /// Reading or updating the ledger failed.
    #[error(transparent)]
    Ledger(LedgerError),

    /// The receipt could not be rendered. The transaction is already completed.
    #[error("failed to render receipt: {0}")]
    Receipt(#[from] ReceiptError),

    /// The receipt could not be mailed. The transaction is already completed.
    #[error("failed to send receipt: {0}")]
    Mail(#[from] EmailError),
}

/// Coordinates the cart, the ledger, the receipt renderer and the mailer.
#[derive(Clone)]
pub struct CheckoutService {
    carts: CartService,
    ledger: TransactionLedger,
    receipts: Arc<dyn ReceiptRenderer>,
    mailer: Arc<dyn Mailer>,
    policy: CheckoutPolicy,
    shop_name: String,
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        carts: CartService,
        ledger: TransactionLedger,
        receipts: Arc<dyn ReceiptRenderer>,
        mailer: Arc<dyn Mailer>,
        policy: CheckoutPolicy,
        shop_name: impl Into<String>,
    ) -> Self {
        Self {
            carts,
            ledger,
            receipts,
            mailer,
            policy,
            shop_name: shop_name.into(),
        }
    }

    /// Turn the user's cart into a pending transaction and empty the cart.
    ///
    /// Only the items captured here are removed from the cart; anything added
    /// concurrently stays. If the cart was cleared in the meantime it is left
    /// exactly as it is.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the policy requires items,
    /// `CheckoutError::TransactionCreateFailed` if the ledger refuses the
    /// transaction (including when one is already pending).
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn checkout(&self, user_id: &UserId) -> Result<Transaction, CheckoutError> {
        let cart = self.carts.get_cart(user_id).await?;
        if cart.is_empty() && self.policy.require_non_empty_cart {
            return Err(CheckoutError::EmptyCart);
        }

        let total = pricing::compute_total(&cart.items);

        let transaction = self
            .ledger
            .create_transaction(user_id, cart.items.clone(), total)
            .await
            .map_err(CheckoutError::TransactionCreateFailed)?;

        match self.carts.remove_checked_out(user_id, &cart).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                transaction_id = %transaction.id,
                "Cart was replaced during checkout, leaving it as is"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                transaction_id = %transaction.id,
                "Transaction created but cart was not cleared"
            ),
        }

        Ok(transaction)
    }

    /// Pay the user's pending transaction and mail them the receipt.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NoPendingTransaction` if there is nothing to pay
    /// (including when a concurrent payment completed it first).
    /// `CheckoutError::Receipt` and `CheckoutError::Mail` are returned after
    /// the transaction has already been completed.
    #[instrument(skip(self, payment), fields(user_id = %user_id))]
    pub async fn pay(
        &self,
        user_id: &UserId,
        payment: &PaymentDetails,
    ) -> Result<Transaction, CheckoutError> {
        let pending = self
            .ledger
            .get_pending_transaction(user_id)
            .await
            .map_err(no_pending_or_ledger)?;

        tracing::info!(
            transaction_id = %pending.id,
            amount = %pending.total_amount,
            card_last4 = %payment.card_last4(),
            "Processing simulated payment"
        );

        let completed = self
            .ledger
            .mark_completed(pending)
            .await
            .map_err(no_pending_or_ledger)?;

        let receipt = self
            .receipts
            .render(&completed, payment.customer_name())?;
        let mail = OutgoingMail::receipt(
            user_id.as_str(),
            &self.shop_name,
            completed.id,
            receipt,
        )?;
        self.mailer.send(mail).await?;

        tracing::info!(transaction_id = %completed.id, "Payment completed and receipt sent");
        Ok(completed)
    }
}

fn no_pending_or_ledger(e: LedgerError) -> CheckoutError {
    match e {
        LedgerError::NotFound => CheckoutError::NoPendingTransaction,
        other => CheckoutError::Ledger(other),
    }
}
