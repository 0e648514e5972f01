//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! bookshop-cli user create -e reader@example.com
//! ```
//!
//! Unlike `/signup`, no mail is sent; the generated password is printed.

use chrono::Utc;
use thiserror::Error;

use bookshop_core::{Email, EmailError};
use bookshop_storefront::db::{self, PgUserStore, RepositoryError, UserStore};
use bookshop_storefront::services::auth::{self, AuthError};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a user and return the generated password.
///
/// # Errors
///
/// Returns `UserError` if the email is invalid, already registered, or the
/// database is unreachable.
pub async fn create_user(email: &str) -> Result<String, UserError> {
    let email = Email::parse(email)?;
    let database_url =
        super::database_url().ok_or(UserError::MissingEnvVar("BOOKSHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    let users = PgUserStore::new(pool);

    let password = auth::generate_password();
    let password_hash = auth::hash_password(&password)?;

    users
        .insert(&email, &password_hash, Utc::now())
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!("User created successfully: {}", email);
    Ok(password)
}
