//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::checkout::CheckoutError;
use crate::services::ledger::LedgerError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Checkout or payment failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cart(err) => cart_status(err),
            Self::Ledger(err) => ledger_status(err),
            Self::Checkout(err) => match err {
                CheckoutError::Cart(err) => cart_status(err),
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::TransactionCreateFailed(err) | CheckoutError::Ledger(err) => {
                    ledger_status(err)
                }
                CheckoutError::NoPendingTransaction => StatusCode::NOT_FOUND,
                CheckoutError::Receipt(_) | CheckoutError::Mail(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show clients. Server errors never leak details.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Cart(err) | Self::Checkout(CheckoutError::Cart(err)) => err.to_string(),
            Self::Ledger(err) => err.to_string(),
            Self::Checkout(CheckoutError::TransactionCreateFailed(LedgerError::PendingExists)) => {
                "A pending transaction already exists; pay or delete it first".to_string()
            }
            Self::Checkout(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::MissingToken => "Missing bearer token".to_string(),
                AuthError::InvalidToken | AuthError::TokenExpired => {
                    "Invalid or expired token".to_string()
                }
                _ => "Authentication error".to_string(),
            },
            Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) => "Internal server error".to_string(),
        }
    }
}

const fn cart_status(err: &CartError) -> StatusCode {
    match err {
        CartError::Validation(_) => StatusCode::BAD_REQUEST,
        CartError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound => StatusCode::NOT_FOUND,
        LedgerError::InvalidTransition { .. } | LedgerError::PendingExists => StatusCode::CONFLICT,
        LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Transaction created", Some(&[("transaction_id", "...")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bookshop_core::CartItemError;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad row".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(
            get_status(CartError::Validation(CartItemError::MissingProductId).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CheckoutError::NoPendingTransaction.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CheckoutError::TransactionCreateFailed(LedgerError::PendingExists).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(
                CheckoutError::TransactionCreateFailed(LedgerError::Store(
                    RepositoryError::Unavailable("down".to_string())
                ))
                .into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(LedgerError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::TokenExpired.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AuthError::PasswordHash.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = AppError::Database(RepositoryError::Unavailable(
            "connection refused to 10.0.0.5".to_string(),
        ))
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_client_errors_are_json() {
        let response = AppError::from(CheckoutError::NoPendingTransaction).into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "no pending transaction");
    }
}
