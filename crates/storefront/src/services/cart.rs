//! Per-user cart operations.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use bookshop_core::{Cart, CartItem, CartItemError, UserId};

use crate::db::{CartStore, RepositoryError};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The submitted item is malformed.
    #[error("invalid cart item: {0}")]
    Validation(#[from] CartItemError),

    /// The cart store failed.
    #[error("cart store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Cart service over an injected [`CartStore`].
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
}

impl CartService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartStore>) -> Self {
        Self { carts }
    }

    /// Append `item` to the user's cart, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a blank product id or a negative
    /// price, `CartError::Store` if the store fails.
    #[instrument(skip(self, item), fields(user_id = %user_id, product_id = %item.product_id))]
    pub async fn add_item(&self, user_id: &UserId, item: CartItem) -> Result<(), CartError> {
        item.validate()?;
        self.carts.push_item(user_id, item).await?;
        tracing::debug!("Item added to cart");
        Ok(())
    }

    /// The user's cart, or an empty one if they never added anything.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Cart, CartError> {
        let cart = self
            .carts
            .find_cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id.clone()));
        Ok(cart)
    }

    /// Empty the user's cart. Never creates one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &UserId) -> Result<(), CartError> {
        let existed = self.carts.set_items(user_id, Vec::new()).await?;
        tracing::debug!(existed, "Cart cleared");
        Ok(())
    }

    /// Remove the items a checkout captured from `snapshot`.
    ///
    /// Items appended after the snapshot stay. Returns `false` without
    /// touching the cart if it was cleared or trimmed since the snapshot was
    /// read.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store fails.
    #[instrument(skip(self, snapshot), fields(user_id = %user_id, count = snapshot.items.len()))]
    pub async fn remove_checked_out(
        &self,
        user_id: &UserId,
        snapshot: &Cart,
    ) -> Result<bool, CartError> {
        if snapshot.is_empty() {
            return Ok(true);
        }
        Ok(self
            .carts
            .remove_front(user_id, snapshot.items.len(), snapshot.revision)
            .await?)
    }
}
