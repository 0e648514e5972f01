//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer, so
//! public routes carry no auth cost.

pub mod auth;
pub mod request_id;

pub use auth::RequireAuth;
pub use request_id::request_id_middleware;
