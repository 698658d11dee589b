//! Handlers for the `/users` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use remat_core::error::CoreError;
use remat_core::types::DbId;
use remat_db::models::transaction::Transaction;
use remat_db::models::user::{CreateUser, User};
use remat_db::repositories::{TransactionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users
///
/// Returns 409 if the email is already registered.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()).into());
    }
    if !input.email.contains('@') {
        return Err(CoreError::Validation(format!("invalid email: {}", input.email)).into());
    }

    let user = UserRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/users/{id}/transactions
///
/// The user's deposit history, newest first.
pub async fn list_user_transactions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Transaction>>>> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let txns = TransactionRepo::list_by_user(&state.pool, id, params.limit_or_default()).await?;
    Ok(Json(DataResponse { data: txns }))
}
