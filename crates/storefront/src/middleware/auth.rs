//! Authentication extractor.
//!
//! Resolves `Authorization: Bearer <token>` to the [`UserId`] the token was
//! issued for.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use bookshop_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 if the header is missing, malformed, wrongly signed or
/// expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user_id): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {user_id}!")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let user_id = state.auth().authenticate(token)?;

        set_sentry_user(&user_id, Some(user_id.as_str()));
        tracing::Span::current().record("user_id", user_id.as_str());

        Ok(Self(user_id))
    }
}

/// The token part of an `Authorization: Bearer` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
