//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Signup, login and bearer token verification
//! - `cart` - Per-user cart operations
//! - `ledger` - Transaction records and status changes
//! - `checkout` - Checkout and payment flows across cart, ledger and mail
//! - `receipt` - Receipt documents for completed transactions
//! - `email` - Outgoing mail (SMTP or log-only)

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod email;
pub mod ledger;
pub mod receipt;

#[cfg(test)]
pub(crate) mod testing;
