//! Handlers for deposits.
//!
//! Both endpoints hand the request to the deposit engine inside one database
//! transaction. Rejections map to 404/409 responses; a failed transaction maps
//! to a retryable 503.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use remat_core::classification::ClassificationResult;
use remat_core::deposit::{DepositOutcome, DepositReceipt, DepositRequest};
use remat_core::scoring::Confidence;
use remat_core::types::DbId;
use remat_core::waste::WasteCategory;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::ImageUpload;
use crate::response::DataResponse;
use crate::state::AppState;

/// JSON body for `POST /deposits`.
#[derive(Debug, Deserialize)]
pub struct CreateDeposit {
    pub user_id: DbId,
    pub bin_id: DbId,
    /// Classifier label or identifier spelling, e.g. `"Washing Machine"`.
    pub category: WasteCategory,
    /// Omitted for deposits with no classification.
    pub confidence: Option<f64>,
    #[serde(default)]
    pub manual_override: bool,
}

/// Response for an image deposit: the receipt and what the classifier saw.
#[derive(Debug, Serialize)]
pub struct ImageDeposit {
    pub deposit: DepositReceipt,
    pub classification: ClassificationResult,
}

/// POST /api/v1/deposits
///
/// Record a deposit whose category is already known (a prior classification
/// or a manual override).
pub async fn create_deposit(
    State(state): State<AppState>,
    Json(input): Json<CreateDeposit>,
) -> AppResult<(StatusCode, Json<DataResponse<DepositReceipt>>)> {
    let request = DepositRequest {
        user_id: input.user_id,
        bin_id: input.bin_id,
        category: input.category,
        confidence: Confidence::from_option(input.confidence)?,
        manual_override: input.manual_override,
    };

    let receipt = execute(&state, &request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}

/// POST /api/v1/deposits/image
///
/// Multipart form with `user_id`, `bin_id` and an `image` file. The image is
/// classified first; if the classifier is unavailable nothing is written.
pub async fn create_image_deposit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<ImageDeposit>>)> {
    let upload = ImageUpload::read(multipart).await?;
    let user_id: DbId = upload.parse_field("user_id")?;
    let bin_id: DbId = upload.parse_field("bin_id")?;

    let classification = state.adapter.classify_image(upload.image()?).await?;

    let request = DepositRequest {
        user_id,
        bin_id,
        category: classification.category,
        confidence: classification.confidence(),
        manual_override: false,
    };

    let deposit = execute(&state, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImageDeposit {
                deposit,
                classification,
            },
        }),
    ))
}

async fn execute(state: &AppState, request: &DepositRequest) -> AppResult<DepositReceipt> {
    let outcome = remat_db::deposit::run_deposit(&state.pool, &state.engine, request)
        .await
        .map_err(AppError::from_deposit_failure)?;

    match outcome {
        DepositOutcome::Accepted(receipt) => Ok(receipt),
        DepositOutcome::Rejected(rejection) => Err(AppError::Rejected(rejection)),
    }
}
