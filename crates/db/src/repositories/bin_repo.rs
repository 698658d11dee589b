//! Repository for the `bins` table.

use remat_core::bin::BinStatus;
use remat_core::types::DbId;
use sqlx::PgPool;

use crate::models::bin::{Bin, CreateBin};

/// Column list for `bins` queries.
const COLUMNS: &str = "\
    id, name, latitude, longitude, capacity, fill_level, status, \
    created_at, updated_at";

/// Provides CRUD operations for bins.
pub struct BinRepo;

impl BinRepo {
    /// Insert a bin. Validation of capacity and fill is the caller's job; the
    /// table's check constraints back it up.
    pub async fn create(pool: &PgPool, input: &CreateBin) -> Result<Bin, sqlx::Error> {
        let status = input.status.clone().unwrap_or(BinStatus::Active);
        let query = format!(
            "INSERT INTO bins (name, latitude, longitude, capacity, fill_level, status)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bin>(&query)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.capacity)
            .bind(input.fill_level)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a bin by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bins WHERE id = $1");
        sqlx::query_as::<_, Bin>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all bins ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Bin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bins ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Bin>(&query).fetch_all(pool).await
    }

    /// Empty a bin after pickup: fill goes to zero and status back to
    /// `active`. This is the only way out of `full`.
    ///
    /// Returns `None` if the bin does not exist.
    pub async fn empty(pool: &PgPool, id: DbId) -> Result<Option<Bin>, sqlx::Error> {
        let status = BinStatus::Active;
        let query = format!(
            "UPDATE bins SET fill_level = 0, status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bin>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
