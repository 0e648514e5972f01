//! HS256 bearer tokens.
//!
//! Compact JWS (`header.claims.signature`, base64url without padding) signed
//! with HMAC-SHA256. Only `HS256` headers are accepted.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use bookshop_core::{Email, UserId};

use super::AuthError;
use crate::config::AuthConfig;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Normalized email of the user.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }
}

/// An issued token and its lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl: Duration::hours(config.token_ttl_hours),
        }
    }

    fn mac(&self) -> Result<Hmac<Sha256>, AuthError> {
        Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Issue a token for `email`, valid from `now` for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if the token cannot be encoded.
    pub fn issue(&self, email: &Email, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let header = Header {
            alg: "HS256".to_owned(),
            typ: "JWT".to_owned(),
        };
        let claims = Claims {
            sub: email.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = serde_json::to_vec(&header).map_err(|e| AuthError::TokenSigning(e.to_string()))?;
        let claims = serde_json::to_vec(&claims).map_err(|e| AuthError::TokenSigning(e.to_string()))?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(AccessToken {
            token: format!("{signing_input}.{signature}"),
            token_type: "Bearer",
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Check signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for anything malformed or wrongly
    /// signed, `AuthError::TokenExpired` once `exp` has passed.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(claims.as_bytes());
        // Constant-time comparison
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let header: Header = decode_segment(header)?;
        if header.alg != "HS256" {
            return Err(AuthError::InvalidToken);
        }

        let claims: Claims = decode_segment(claims)?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidToken)
}
