pub mod bins;
pub mod deposits;
pub mod health;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                          effective points table (GET)
/// /classify                            classify an image, no side effects (POST)
///
/// /deposits                            deposit with a known category (POST)
/// /deposits/image                      classify then deposit (POST, multipart)
///
/// /bins                                list, create
/// /bins/{id}                           get
/// /bins/{id}/empty                     reset after pickup (POST)
/// /bins/{id}/transactions              deposits into the bin (GET)
///
/// /users                               create
/// /users/{id}                          get
/// /users/{id}/transactions             deposit history (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::categories::list_categories))
        .route("/classify", post(handlers::classify::classify))
        .nest("/deposits", deposits::router())
        .nest("/bins", bins::router())
        .nest("/users", users::router())
}
