//! Core types for the bookshop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod transaction;

pub use cart::{Cart, CartItem, CartItemError};
pub use email::{Email, EmailError};
pub use id::{TransactionId, UserId};
pub use price::{CurrencyCode, Price};
pub use status::TransactionStatus;
pub use transaction::{NewTransaction, Transaction};
