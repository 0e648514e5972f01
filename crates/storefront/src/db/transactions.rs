//! `PostgreSQL` transaction store.
//!
//! A partial unique index on `(user_id) WHERE status = 'pending'` backs the
//! one-pending-per-user rule; violations surface as `Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use bookshop_core::{
    CartItem, NewTransaction, Transaction, TransactionId, TransactionStatus, UserId,
};

use super::{RepositoryError, TransactionStore, map_unique_violation};

const COLUMNS: &str = "id, user_id, items, total_amount, status, created_at";

/// Transaction store backed by `bookshop.transaction`.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    /// Create a new transaction store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    items: Json<serde_json::Value>,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> = serde_json::from_value(row.items.0).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid transaction items: {e}"))
        })?;
        let status: TransactionStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid transaction status: {e}"))
        })?;

        Ok(Self {
            id: TransactionId::from(row.id),
            user_id: UserId::new(row.user_id),
            items,
            total_amount: row.total_amount,
            status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, new: NewTransaction) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            INSERT INTO bookshop.transaction (user_id, items, total_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "
        ))
        .bind(new.user_id.as_str())
        .bind(Json(&new.items))
        .bind(new.total_amount)
        .bind(new.status.as_str())
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "pending transaction already exists"))?;

        Transaction::try_from(row)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {COLUMNS} FROM bookshop.transaction WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_pending(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            SELECT {COLUMNS}
            FROM bookshop.transaction
            WHERE user_id = $1 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            SELECT {COLUMNS}
            FROM bookshop.transaction
            WHERE user_id = $1
            ORDER BY created_at ASC
            "
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: TransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bookshop.transaction
            SET status = $3
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(new.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "pending transaction already exists"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_latest(&self, user_id: &UserId) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            DELETE FROM bookshop.transaction
            WHERE id = (
                SELECT id FROM bookshop.transaction
                WHERE user_id = $1
                ORDER BY created_at DESC
                LIMIT 1
            )
            RETURNING {COLUMNS}
            "
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }
}
