//! Handler for the effective points table.

use axum::extract::State;
use axum::Json;
use remat_core::waste::{CategoryPoints, WasteCategory};
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

/// One row of the points table.
#[derive(Debug, Serialize)]
pub struct CategoryEntry {
    pub category: WasteCategory,
    pub class_index: usize,
    #[serde(flatten)]
    pub points: CategoryPoints,
}

/// The points table as served.
#[derive(Debug, Serialize)]
pub struct CategoryTable {
    pub categories: Vec<CategoryEntry>,
    /// Applied to any category the table does not list.
    pub default: CategoryPoints,
}

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> Json<DataResponse<CategoryTable>> {
    let table = state.engine.points_table();
    let categories = table
        .effective()
        .into_iter()
        .enumerate()
        .map(|(class_index, (category, points))| CategoryEntry {
            category,
            class_index,
            points,
        })
        .collect();

    Json(DataResponse {
        data: CategoryTable {
            categories,
            default: table.default_points(),
        },
    })
}
