//! Domain models for the storefront.

pub mod payment;
pub mod user;

pub use payment::PaymentDetails;
pub use user::User;
