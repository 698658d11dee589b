//! Query parameter types shared by handler modules.

use serde::Deserialize;

/// Rows returned by history endpoints when `?limit=` is absent.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// `?limit=` for history listings. Clamped in the repository layer.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    pub fn limit_or_default(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }
}
