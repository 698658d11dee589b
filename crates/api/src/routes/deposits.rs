use axum::routing::post;
use axum::Router;

use crate::handlers::deposits;
use crate::state::AppState;

/// Routes mounted at `/deposits`.
///
/// ```text
/// POST   /                       -> create_deposit
/// POST   /image                  -> create_image_deposit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(deposits::create_deposit))
        .route("/image", post(deposits::create_image_deposit))
}
