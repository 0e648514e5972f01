//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use bookshop_core::{Email, UserId};

/// A registered shopper.
///
/// Implements `Debug` manually to keep the password hash out of logs.
#[derive(Clone)]
pub struct User {
    /// Normalized email; doubles as the user's identity.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity used to key carts and transactions.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.email.user_id()
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}
