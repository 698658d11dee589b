//! Handlers for the `/bins` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use remat_core::bin::{status_for_fill, validate_capacity, BinStatus};
use remat_core::error::CoreError;
use remat_core::types::DbId;
use remat_db::models::bin::{Bin, CreateBin};
use remat_db::models::transaction::Transaction;
use remat_db::repositories::{BinRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bins
pub async fn list_bins(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Bin>>>> {
    let bins = BinRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: bins }))
}

/// POST /api/v1/bins
///
/// Register a bin. A bin created at or past its full threshold is stored as
/// `full`.
pub async fn create_bin(
    State(state): State<AppState>,
    Json(mut input): Json<CreateBin>,
) -> AppResult<(StatusCode, Json<DataResponse<Bin>>)> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()).into());
    }
    let fill_level = input.fill_level.unwrap_or(0);
    validate_capacity(input.capacity, fill_level)?;

    let status = input.status.take().unwrap_or(BinStatus::Active);
    input.status = Some(status_for_fill(&status, input.capacity, fill_level));

    let bin = BinRepo::create(&state.pool, &input).await?;
    tracing::info!(bin_id = bin.id, capacity = bin.capacity, "Bin registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: bin })))
}

/// GET /api/v1/bins/{id}
pub async fn get_bin(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Bin>>> {
    let bin = BinRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bin", id }))?;
    Ok(Json(DataResponse { data: bin }))
}

/// POST /api/v1/bins/{id}/empty
///
/// Reset a bin after pickup: fill goes to zero and status back to `active`.
pub async fn empty_bin(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Bin>>> {
    let bin = BinRepo::empty(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bin", id }))?;
    tracing::info!(bin_id = id, "Bin emptied");
    Ok(Json(DataResponse { data: bin }))
}

/// GET /api/v1/bins/{id}/transactions
pub async fn list_bin_transactions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Transaction>>>> {
    BinRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Bin", id }))?;

    let txns = TransactionRepo::list_by_bin(&state.pool, id, params.limit_or_default()).await?;
    Ok(Json(DataResponse { data: txns }))
}
