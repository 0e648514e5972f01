//! Authentication service.
//!
//! Signup mails a generated password; login exchanges email + password for
//! an HS256 bearer token.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{AccessToken, Claims, TokenIssuer};

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::instrument;

use bookshop_core::{Email, UserId};

use crate::config::AuthConfig;
use crate::db::{RepositoryError, UserStore};
use crate::models::User;
use crate::services::email::{Mailer, OutgoingMail};

/// Length of the password generated at signup.
const GENERATED_PASSWORD_LENGTH: usize = 10;

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, config: &AuthConfig) -> Self {
        Self {
            users,
            mailer,
            tokens: TokenIssuer::new(config),
        }
    }

    /// Register `email` with a generated password and mail it to them.
    ///
    /// Returns the user together with the plain password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    /// Returns `AuthError::Mail` if the account was created but the mail failed.
    #[instrument(skip(self))]
    pub async fn signup(&self, email: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let password = generate_password();
        let password_hash = hash_password(&password)?;

        let user = self
            .users
            .insert(&email, &password_hash, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(email = %user.email, "User registered");

        self.mailer
            .send(OutgoingMail::password(user.email.as_str(), &password)?)
            .await?;

        Ok((user, password))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let token = self.tokens.issue(&user.email, Utc::now())?;
        tracing::info!(email = %user.email, "User logged in");
        Ok(token)
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` or `AuthError::TokenExpired`.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        Ok(self.tokens.verify(token, Utc::now())?.user_id())
    }
}

/// Random alphanumeric password for a new account.
#[must_use]
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a password with Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
