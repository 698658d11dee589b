//! Deposit transaction ledger model.
//!
//! Rows are written only by the deposit unit of work and never updated.

use remat_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: DbId,
    pub bin_id: DbId,
    pub waste_category: String,
    pub confidence: Option<f64>,
    pub points_awarded: i32,
    pub created_at: Timestamp,
}
