//! Shopping cart types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Errors raised when validating a [`CartItem`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemError {
    #[error("product_id is required")]
    MissingProductId,
    #[error("price cannot be negative (got {0})")]
    NegativePrice(Decimal),
}

/// A line in a cart.
///
/// Lines have no identity beyond `product_id`, and adding the same product
/// twice yields two lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    #[serde(rename = "price", alias = "unit_price")]
    pub unit_price: Decimal,
}

impl CartItem {
    /// Create a new cart line.
    #[must_use]
    pub fn new(product_id: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Check the line can be stored in a cart.
    ///
    /// # Errors
    ///
    /// Returns `CartItemError::MissingProductId` for a blank product id and
    /// `CartItemError::NegativePrice` for a price below zero.
    pub fn validate(&self) -> Result<(), CartItemError> {
        if self.product_id.trim().is_empty() {
            return Err(CartItemError::MissingProductId);
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(CartItemError::NegativePrice(self.unit_price));
        }
        Ok(())
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    /// `None` until the cart is first written.
    pub updated_at: Option<DateTime<Utc>>,
    /// Bumped whenever the item list is replaced or trimmed. Appends leave it
    /// alone, so while it is unchanged the items read at that revision are
    /// still the head of the cart.
    #[serde(skip)]
    pub revision: i64,
}

impl Cart {
    /// The cart of a user who has never added anything.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: None,
            revision: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_product_id() {
        let item = CartItem::new("  ", 1, Decimal::ONE);
        assert_eq!(item.validate(), Err(CartItemError::MissingProductId));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let item = CartItem::new("book-1", 1, Decimal::new(-1, 2));
        assert!(matches!(
            item.validate(),
            Err(CartItemError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_validate_accepts_free_items() {
        assert!(CartItem::new("bookmark", 0, Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_wire_format_uses_price() {
        let item: CartItem =
            serde_json::from_str(r#"{"product_id":"A","quantity":2,"price":5.0}"#).unwrap();
        assert_eq!(item, CartItem::new("A", 2, Decimal::new(50, 1)));

        let aliased: CartItem =
            serde_json::from_str(r#"{"product_id":"A","quantity":2,"unit_price":"5.0"}"#).unwrap();
        assert_eq!(aliased, item);

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("price").is_some());
        assert!(json.get("unit_price").is_none());
    }

    #[test]
    fn test_negative_quantity_is_rejected_by_type() {
        let result =
            serde_json::from_str::<CartItem>(r#"{"product_id":"A","quantity":-1,"price":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty(UserId::from("reader@shop.com"));
        assert!(cart.is_empty());
        assert!(cart.updated_at.is_none());
        assert_eq!(cart.revision, 0);
    }

    #[test]
    fn test_revision_stays_off_the_wire() {
        let mut cart = Cart::empty(UserId::from("reader@shop.com"));
        cart.revision = 7;
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("revision").is_none());
    }
}
