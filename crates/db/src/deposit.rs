//! Postgres-backed unit of work for the deposit engine.
//!
//! Each unit wraps one database transaction. The bin row is read with
//! `SELECT ... FOR UPDATE`, so concurrent deposits into the same bin queue on
//! the row lock instead of overwriting each other's fill level. Dropping the
//! unit without committing rolls everything back.

use remat_core::bin::{BinSnapshot, BinStatus, FillTransition};
use remat_core::deposit::{
    DepositEngine, DepositOutcome, DepositRequest, DepositUnitOfWork, NewTransaction,
};
use remat_core::types::DbId;
use sqlx::{PgPool, Postgres};

/// A deposit in progress against PostgreSQL.
pub struct PgDepositUnit {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PgDepositUnit {
    /// Open a new database transaction.
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }
}

impl DepositUnitOfWork for PgDepositUnit {
    type Error = sqlx::Error;

    async fn load_bin_for_update(
        &mut self,
        bin_id: DbId,
    ) -> Result<Option<BinSnapshot>, sqlx::Error> {
        let row: Option<(DbId, i32, i32, String)> = sqlx::query_as(
            "SELECT id, capacity, fill_level, status FROM bins WHERE id = $1 FOR UPDATE",
        )
        .bind(bin_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(id, capacity, fill_level, status)| BinSnapshot {
            id,
            capacity,
            fill_level,
            status: BinStatus::parse(&status),
        }))
    }

    async fn user_exists(&mut self, user_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.0)
    }

    async fn mark_bin_full(&mut self, bin_id: DbId) -> Result<(), sqlx::Error> {
        let status = BinStatus::Full;
        sqlx::query("UPDATE bins SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(bin_id)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_transaction(&mut self, record: &NewTransaction) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO transactions \
                (id, user_id, bin_id, waste_category, confidence, points_awarded) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.bin_id)
        .bind(record.category.label())
        .bind(record.confidence)
        .bind(record.points_awarded)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn add_user_points(&mut self, user_id: DbId, points: i32) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET points = points + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(points)
        .execute(&mut *self.tx)
        .await?;

        // The engine checked the user inside this transaction; a miss here
        // means the row vanished, and committing would orphan the ledger row.
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn update_bin_fill(
        &mut self,
        bin_id: DbId,
        transition: &FillTransition,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bins SET fill_level = $2, status = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(bin_id)
        .bind(transition.fill_level)
        .bind(transition.status.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

/// Run one deposit in a fresh transaction.
pub async fn run_deposit(
    pool: &PgPool,
    engine: &DepositEngine,
    request: &DepositRequest,
) -> Result<DepositOutcome, sqlx::Error> {
    let unit = PgDepositUnit::begin(pool).await?;
    engine.deposit(unit, request).await.map_err(|e| {
        tracing::error!(
            error = %e,
            bin_id = request.bin_id,
            user_id = request.user_id,
            "Deposit rolled back"
        );
        e
    })
}
