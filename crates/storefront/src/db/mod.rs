//! Persistence for carts, transactions and users.
//!
//! # Database: `bookshop`
//!
//! ## Tables
//!
//! - `bookshop.user` - Registered accounts (email + password hash)
//! - `bookshop.cart` - One row per user, items stored as a JSONB array
//! - `bookshop.transaction` - Checkout records, at most one `pending` per user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p bookshop-cli -- migrate
//! ```
//!
//! Every store is a trait so the services can run against `PostgreSQL` in
//! production and [`MemoryStore`] in tests or when no database is configured.

pub mod carts;
pub mod memory;
pub mod transactions;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use bookshop_core::{
    Cart, CartItem, Email, NewTransaction, Transaction, TransactionId, TransactionStatus, UserId,
};

use crate::models::User;

pub use carts::PgCartStore;
pub use memory::MemoryStore;
pub use transactions::PgTransactionStore;
pub use users::PgUserStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store could not be converted to domain types.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store backend unreachable or refusing work.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}

/// Per-user cart documents.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Append one item, creating the cart if the user has none.
    async fn push_item(&self, user_id: &UserId, item: CartItem) -> Result<(), RepositoryError>;

    /// Fetch a user's cart. `None` if it was never created.
    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Replace the item list of an existing cart.
    ///
    /// Does not create a cart. Returns `false` if the user had none.
    async fn set_items(&self, user_id: &UserId, items: Vec<CartItem>)
    -> Result<bool, RepositoryError>;

    /// Atomically drop the first `count` items of the cart, keeping anything
    /// appended after them.
    ///
    /// Only applies while the cart is still at `revision`; returns `false`
    /// and leaves the cart alone once it was replaced or trimmed since.
    async fn remove_front(
        &self,
        user_id: &UserId,
        count: usize,
        revision: i64,
    ) -> Result<bool, RepositoryError>;
}

/// Transaction records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Store a new record and return it with its assigned id.
    ///
    /// Fails with `Conflict` if `new` is pending and the user already has a
    /// pending transaction.
    async fn insert(&self, new: NewTransaction) -> Result<Transaction, RepositoryError>;

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError>;

    /// The user's pending transaction, most recent first if several exist.
    async fn find_pending(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError>;

    /// All of a user's transactions, oldest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, RepositoryError>;

    /// Set `status` to `new` only if it currently equals `expected`.
    ///
    /// Returns `true` when the row was changed.
    async fn compare_and_set_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
    ) -> Result<bool, RepositoryError>;

    /// Delete and return the user's most recently created transaction.
    async fn delete_latest(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError>;
}

/// Registered accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account.
    ///
    /// Returns `Conflict` if the email is already registered.
    async fn insert(
        &self,
        email: &Email,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
