//! Transaction ledger: creation, lookup and status changes.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use bookshop_core::{
    CartItem, NewTransaction, Transaction, TransactionId, TransactionStatus, UserId,
};

use crate::db::{RepositoryError, TransactionStore};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No transaction matched.
    #[error("transaction not found")]
    NotFound,

    /// Status may only move forward.
    #[error("cannot move transaction from {from} to {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// The user already has a pending transaction.
    #[error("a pending transaction already exists")]
    PendingExists,

    /// The transaction store failed.
    #[error("transaction store error: {0}")]
    Store(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::PendingExists,
            other => Self::Store(other),
        }
    }
}

/// Ledger over an injected [`TransactionStore`].
#[derive(Clone)]
pub struct TransactionLedger {
    transactions: Arc<dyn TransactionStore>,
}

impl TransactionLedger {
    #[must_use]
    pub fn new(transactions: Arc<dyn TransactionStore>) -> Self {
        Self { transactions }
    }

    /// Record a pending transaction holding a copy of `items`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PendingExists` if the user already has a pending
    /// transaction, `LedgerError::Store` if the store fails.
    #[instrument(skip(self, items), fields(user_id = %user_id, item_count = items.len()))]
    pub async fn create_transaction(
        &self,
        user_id: &UserId,
        items: Vec<CartItem>,
        total_amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        let transaction = self
            .transactions
            .insert(NewTransaction {
                user_id: user_id.clone(),
                items,
                total_amount,
                status: TransactionStatus::Pending,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(transaction_id = %transaction.id, total = %transaction.total_amount, "Transaction created");
        Ok(transaction)
    }

    /// The user's pending transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if there is none.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_pending_transaction(&self, user_id: &UserId) -> Result<Transaction, LedgerError> {
        self.transactions
            .find_pending(user_id)
            .await?
            .ok_or(LedgerError::NotFound)
    }

    /// Move a transaction to `new_status`.
    ///
    /// Setting the status a transaction already has succeeds without a write.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` for an unknown id and
    /// `LedgerError::InvalidTransition` for completed → pending.
    #[instrument(skip(self), fields(transaction_id = %id, status = %new_status))]
    pub async fn update_status(
        &self,
        id: TransactionId,
        new_status: TransactionStatus,
    ) -> Result<(), LedgerError> {
        loop {
            let current = self
                .transactions
                .find_by_id(id)
                .await?
                .ok_or(LedgerError::NotFound)?
                .status;

            if current == new_status {
                return Ok(());
            }
            if !current.can_transition_to(new_status) {
                return Err(LedgerError::InvalidTransition {
                    from: current,
                    to: new_status,
                });
            }
            if self
                .transactions
                .compare_and_set_status(id, current, new_status)
                .await?
            {
                tracing::info!(from = %current, "Transaction status updated");
                return Ok(());
            }
            // Someone else changed the status between the read and the write.
        }
    }

    /// Complete a pending transaction exactly once.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the transaction is gone or no longer
    /// pending.
    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    pub async fn mark_completed(&self, transaction: Transaction) -> Result<Transaction, LedgerError> {
        let changed = self
            .transactions
            .compare_and_set_status(
                transaction.id,
                TransactionStatus::Pending,
                TransactionStatus::Completed,
            )
            .await?;

        if !changed {
            return Err(LedgerError::NotFound);
        }

        Ok(Transaction {
            status: TransactionStatus::Completed,
            ..transaction
        })
    }

    /// All of the user's transactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Store` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.transactions.list_for_user(user_id).await?)
    }

    /// Delete and return the user's newest transaction, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the user has no transactions.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_most_recent(&self, user_id: &UserId) -> Result<Transaction, LedgerError> {
        let deleted = self
            .transactions
            .delete_latest(user_id)
            .await?
            .ok_or(LedgerError::NotFound)?;

        tracing::info!(transaction_id = %deleted.id, status = %deleted.status, "Transaction deleted");
        Ok(deleted)
    }
}
