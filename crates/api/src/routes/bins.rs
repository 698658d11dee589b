//! Route definitions for the `/bins` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bins;
use crate::state::AppState;

/// Routes mounted at `/bins`.
///
/// ```text
/// GET    /                       -> list_bins
/// POST   /                       -> create_bin
/// GET    /{id}                   -> get_bin
/// POST   /{id}/empty             -> empty_bin
/// GET    /{id}/transactions      -> list_bin_transactions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bins::list_bins).post(bins::create_bin))
        .route("/{id}", get(bins::get_bin))
        .route("/{id}/empty", post(bins::empty_bin))
        .route("/{id}/transactions", get(bins::list_bin_transactions))
}
