//! Bookshop Core - Shared domain types and pricing.
//!
//! This crate provides the types shared by every Bookshop component:
//! - `storefront` - HTTP service for carts, checkout and payment
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, prices, carts, transactions and their statuses
//! - [`pricing`] - Cart and line totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
