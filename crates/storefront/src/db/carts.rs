//! `PostgreSQL` cart store.
//!
//! A cart is one row holding its items as a JSONB array, so every mutation
//! below is a single atomic statement on that row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use bookshop_core::{Cart, CartItem, UserId};

use super::{CartStore, RepositoryError};

/// Cart store backed by `bookshop.cart`.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    user_id: String,
    items: Json<serde_json::Value>,
    updated_at: DateTime<Utc>,
    revision: i64,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> = serde_json::from_value(row.items.0)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid cart items: {e}")))?;

        Ok(Self {
            user_id: UserId::new(row.user_id),
            items,
            updated_at: Some(row.updated_at),
            revision: row.revision,
        })
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn push_item(&self, user_id: &UserId, item: CartItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO bookshop.cart (user_id, items, updated_at)
            VALUES ($1, jsonb_build_array($2::jsonb), now())
            ON CONFLICT (user_id) DO UPDATE
            SET items = bookshop.cart.items || EXCLUDED.items,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(user_id.as_str())
        .bind(Json(&item))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT user_id, items, updated_at, revision
            FROM bookshop.cart
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Cart::try_from).transpose()
    }

    async fn set_items(
        &self,
        user_id: &UserId,
        items: Vec<CartItem>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bookshop.cart
            SET items = $2, revision = revision + 1, updated_at = now()
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_str())
        .bind(Json(&items))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_front(
        &self,
        user_id: &UserId,
        count: usize,
        revision: i64,
    ) -> Result<bool, RepositoryError> {
        let count = i64::try_from(count).unwrap_or(i64::MAX);

        let result = sqlx::query(
            r"
            UPDATE bookshop.cart
            SET items = COALESCE(
                    (SELECT jsonb_agg(elem ORDER BY idx)
                     FROM jsonb_array_elements(items) WITH ORDINALITY AS t(elem, idx)
                     WHERE idx > $2),
                    '[]'::jsonb),
                revision = revision + 1,
                updated_at = now()
            WHERE user_id = $1
              AND revision = $3
              AND jsonb_array_length(items) >= $2
            ",
        )
        .bind(user_id.as_str())
        .bind(count)
        .bind(revision)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
