//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bookshop_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Token is malformed or its signature does not match.
    #[error("invalid token")]
    InvalidToken,

    /// Token signature is fine but it has expired.
    #[error("token expired")]
    TokenExpired,

    /// Token could not be produced.
    #[error("token signing failed: {0}")]
    TokenSigning(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// The password mail could not be sent.
    #[error("failed to send password email: {0}")]
    Mail(#[from] EmailError),
}
