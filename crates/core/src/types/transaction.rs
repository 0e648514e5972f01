//! Checkout transaction records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::{TransactionId, UserId};
use super::status::TransactionStatus;

/// A checkout event.
///
/// Everything except `status` is fixed once the record is written; `items`
/// is a copy of the cart taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// A transaction that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Attach the store-assigned id.
    #[must_use]
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            items: self.items,
            total_amount: self.total_amount,
            status: self.status,
            created_at: self.created_at,
        }
    }
}
