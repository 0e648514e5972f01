//! Signup and login handlers.

use axum::{
    Json,
    extract::State,
    http::header::AUTHORIZATION,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::JsonBody;
use crate::error::Result;
use crate::services::auth::AccessToken;
use crate::state::AppState;

/// Signup request body.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
}

/// Login request body.
///
/// Implements `Debug` manually to redact the password.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Signup response body. The password itself only travels by email.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub email: String,
    pub message: &'static str,
}

/// Register a new user and email them a generated password.
#[instrument(skip_all, fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    let (user, _password) = state.auth().signup(&request.email).await?;
    Ok(Json(SignupResponse {
        email: user.email.to_string(),
        message: "Your password has been sent to your email address",
    }))
}

/// Exchange email and password for a bearer token.
///
/// The token is returned both in the `Authorization` header and the body.
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let token: AccessToken = state.auth().login(&request.email, &request.password).await?;
    let header = format!("Bearer {}", token.token);
    Ok((AppendHeaders([(AUTHORIZATION, header)]), Json(token)))
}
