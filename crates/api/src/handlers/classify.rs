//! Handler for classification previews.

use axum::extract::{Multipart, State};
use axum::Json;
use remat_core::classification::ClassificationPreview;

use crate::error::AppResult;
use crate::handlers::upload::ImageUpload;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/classify
///
/// Classify an uploaded `image` and report the points it would earn. Nothing
/// is persisted.
pub async fn classify(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ClassificationPreview>>> {
    let upload = ImageUpload::read(multipart).await?;
    let result = state.adapter.classify_image(upload.image()?).await?;
    let preview = ClassificationPreview::new(result, state.engine.points_table());
    Ok(Json(DataResponse { data: preview }))
}
