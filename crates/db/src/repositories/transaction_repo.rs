//! Read-only repository for the `transactions` ledger.

use remat_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::transaction::Transaction;

/// Column list for `transactions` queries.
const COLUMNS: &str = "\
    id, user_id, bin_id, waste_category, confidence, points_awarded, created_at";

/// Maximum rows returned by the list queries.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Queries over deposit transactions. Inserts go through
/// [`crate::deposit::PgDepositUnit`].
pub struct TransactionRepo;

impl TransactionRepo {
    /// Find a transaction by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's deposits, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .bind(limit.clamp(1, MAX_PAGE_SIZE))
            .fetch_all(pool)
            .await
    }

    /// Deposits into a bin, newest first.
    pub async fn list_by_bin(
        pool: &PgPool,
        bin_id: DbId,
        limit: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions \
             WHERE bin_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(bin_id)
            .bind(limit.clamp(1, MAX_PAGE_SIZE))
            .fetch_all(pool)
            .await
    }

    /// Number of deposits into a bin.
    pub async fn count_by_bin(pool: &PgPool, bin_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE bin_id = $1")
            .bind(bin_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
