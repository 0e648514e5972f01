//! Integration tests for the Bookshop backend.
//!
//! The tests drive the full storefront router in-process over the
//! in-memory stores, so no database or SMTP server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_auth` - Signup, login and bearer token checks
//! - `storefront_checkout` - Cart, checkout, payment and history flows

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bookshop_storefront::config::{AuthConfig, CheckoutPolicy, ReceiptConfig, StorefrontConfig};
use bookshop_storefront::services::email::{EmailError, Mailer, OutgoingMail};
use bookshop_storefront::state::{AppState, Stores};

/// Signing key used by every test app.
pub const TEST_JWT_SECRET: &str = "k9$Qw2!zR7@pL4#xT1&vN8*cB5^mJ3%h";

/// Keeps every mail the app sends so tests can read passwords and receipts.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    /// Mails sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The password from the most recent signup mail to `to`.
    #[must_use]
    pub fn password_for(&self, to: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .filter(|mail| mail.to == to)
            .find_map(|mail| {
                mail.text_body
                    .lines()
                    .find_map(|line| line.strip_prefix("Your password is: "))
                    .map(|password| password.trim().to_string())
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail);
        Ok(())
    }
}

/// Configuration for an in-process test app.
#[must_use]
pub fn test_config(policy: CheckoutPolicy) -> StorefrontConfig {
    StorefrontConfig {
        database_url: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        auth: AuthConfig {
            jwt_secret: SecretString::from(TEST_JWT_SECRET),
            token_ttl_hours: 24,
        },
        checkout: policy,
        receipt: ReceiptConfig::default(),
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A storefront router over fresh in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CheckoutPolicy::default())
    }

    #[must_use]
    pub fn with_policy(policy: CheckoutPolicy) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(test_config(policy), Stores::memory(), mailer.clone(), None);
        Self {
            router: bookshop_storefront::app(state),
            mailer,
        }
    }

    /// Send one request and return the status with the parsed JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Sign up `email`, then log in with the mailed password.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    #[allow(clippy::unwrap_used)]
    pub async fn login_new_user(&self, email: &str) -> String {
        let (status, _) = self
            .request("POST", "/signup", None, Some(serde_json::json!({ "email": email })))
            .await;
        assert_eq!(status, StatusCode::OK);

        let password = self.mailer.password_for(email).unwrap();
        let (status, body) = self
            .request(
                "POST",
                "/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
