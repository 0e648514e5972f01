//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Database URL from `BOOKSHOP_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("BOOKSHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
