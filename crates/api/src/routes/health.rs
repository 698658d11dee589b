use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is reachable, otherwise `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the model server reports the model as loaded.
    pub classifier_healthy: bool,
}

/// GET /health -- returns service, database and classifier health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db, classifier_healthy) =
        tokio::join!(remat_db::health_check(&state.pool), state.classifier.ready());
    let db_healthy = db.is_ok();

    let status = if db_healthy && classifier_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        classifier_healthy,
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
