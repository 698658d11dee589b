//! Bin entity model and DTOs.

use remat_core::bin::BinStatus;
use remat_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bin {
    pub id: DbId,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i32,
    pub fill_level: i32,
    /// Free-text status; compare through [`Bin::parsed_status`].
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Bin {
    pub fn parsed_status(&self) -> BinStatus {
        BinStatus::parse(&self.status)
    }
}

/// DTO for registering a bin.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBin {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i32,
    /// Defaults to `0`.
    pub fill_level: Option<i32>,
    /// Defaults to `active`.
    pub status: Option<BinStatus>,
}
