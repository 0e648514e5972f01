//! In-memory store used by tests and by local runs without a database.
//!
//! Each map is guarded by its own `RwLock`; every trait method holds the lock
//! for its whole read-modify-write, which gives the same per-document
//! atomicity the `PostgreSQL` statements provide.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use bookshop_core::{
    Cart, CartItem, Email, NewTransaction, Transaction, TransactionId, TransactionStatus, UserId,
};

use super::{CartStore, RepositoryError, TransactionStore, UserStore};
use crate::models::User;

/// Process-local implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    carts: RwLock<HashMap<UserId, Cart>>,
    transactions: RwLock<Vec<Transaction>>,
    users: RwLock<HashMap<Email, User>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn push_item(&self, user_id: &UserId, item: CartItem) -> Result<(), RepositoryError> {
        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::empty(user_id.clone()));
        cart.items.push(item);
        cart.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.carts.read().await.get(user_id).cloned())
    }

    async fn set_items(
        &self,
        user_id: &UserId,
        items: Vec<CartItem>,
    ) -> Result<bool, RepositoryError> {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get_mut(user_id) else {
            return Ok(false);
        };
        cart.items = items;
        cart.revision += 1;
        cart.updated_at = Some(Utc::now());
        Ok(true)
    }

    async fn remove_front(
        &self,
        user_id: &UserId,
        count: usize,
        revision: i64,
    ) -> Result<bool, RepositoryError> {
        let mut carts = self.carts.write().await;
        let Some(cart) = carts.get_mut(user_id) else {
            return Ok(false);
        };
        if cart.revision != revision || cart.items.len() < count {
            return Ok(false);
        }
        cart.items.drain(..count);
        cart.revision += 1;
        cart.updated_at = Some(Utc::now());
        Ok(true)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert(&self, new: NewTransaction) -> Result<Transaction, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        if new.status == TransactionStatus::Pending
            && transactions
                .iter()
                .any(|t| t.user_id == new.user_id && t.is_pending())
        {
            return Err(RepositoryError::Conflict(
                "pending transaction already exists".to_owned(),
            ));
        }

        let transaction = new.into_transaction(TransactionId::generate());
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_pending(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError> {
        Ok(self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| &t.user_id == user_id && t.is_pending())
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let mut list: Vec<Transaction> = self
            .transactions
            .read()
            .await
            .iter()
            .filter(|t| &t.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        list.sort_by_key(|t| t.created_at);
        Ok(list)
    }

    async fn compare_and_set_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
    ) -> Result<bool, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        match transactions
            .iter_mut()
            .find(|t| t.id == id && t.status == expected)
        {
            Some(transaction) => {
                transaction.status = new;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_latest(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError> {
        let mut transactions = self.transactions.write().await;
        // Later insertion wins a timestamp tie.
        let latest = transactions
            .iter()
            .enumerate()
            .filter(|(_, t)| &t.user_id == user_id)
            .max_by_key(|(index, t)| (t.created_at, *index))
            .map(|(index, _)| index);

        Ok(latest.map(|index| transactions.remove(index)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(
        &self,
        email: &Email,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            email: email.clone(),
            password_hash: password_hash.to_owned(),
            created_at,
        };
        users.insert(email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
