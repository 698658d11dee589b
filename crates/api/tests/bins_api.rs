//! HTTP-level integration tests for `/api/v1/bins` and `/api/v1/users`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_bin, create_user, get, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Bins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_fetch_bin(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app.clone(),
        "/api/v1/bins",
        json!({ "name": "Campus Gate", "capacity": 50 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["fill_level"], 0);
    assert_eq!(created["data"]["status"], "active");

    let id = created["data"]["id"].as_i64().unwrap();
    let fetched = body_json(get(app.clone(), &format!("/api/v1/bins/{id}")).await).await;
    assert_eq!(fetched["data"]["name"], "Campus Gate");

    let listed = body_json(get(app, "/api/v1/bins").await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bin_created_past_threshold_is_full(pool: PgPool) {
    let app = build_test_app(pool);
    let id = create_bin(app.clone(), 10, 9, "active").await;

    let json = body_json(get(app, &format!("/api/v1/bins/{id}")).await).await;
    assert_eq!(json["data"]["status"], "full");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_bins_are_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/bins",
        json!({ "name": "Zero", "capacity": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        app,
        "/api/v1/bins",
        json!({ "name": "Overfull", "capacity": 10, "fill_level": 11 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_bin_is_404(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/bins/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn emptying_reopens_full_bin_for_deposits(pool: PgPool) {
    let app = build_test_app(pool);
    let bin_id = create_bin(app.clone(), 100, 95, "full").await;
    let user_id = create_user(app.clone(), "pickup@example.com").await;

    let response = post_empty(app.clone(), &format!("/api/v1/bins/{bin_id}/empty")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["fill_level"], 0);
    assert_eq!(json["data"]["status"], "active");

    let response = post_json(
        app.clone(),
        "/api/v1/deposits",
        json!({ "user_id": user_id, "bin_id": bin_id, "category": "Keyboard", "confidence": 0.5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["points_awarded"], 21);

    let history = body_json(get(app, &format!("/api/v1/bins/{bin_id}/transactions")).await).await;
    let rows = history["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["waste_category"], "Keyboard");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn emptying_missing_bin_is_404(pool: PgPool) {
    let response = post_empty(build_test_app(pool), "/api/v1/bins/9999/empty").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_is_409(pool: PgPool) {
    let app = build_test_app(pool);
    create_user(app.clone(), "dup@example.com").await;

    let response = post_json(
        app,
        "/api/v1/users",
        json!({ "name": "Again", "email": "dup@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn user_history_lists_newest_first(pool: PgPool) {
    let app = build_test_app(pool);
    let bin_id = create_bin(app.clone(), 100, 0, "active").await;
    let user_id = create_user(app.clone(), "history@example.com").await;

    for category in ["Mouse", "Television"] {
        let response = post_json(
            app.clone(),
            "/api/v1/deposits",
            json!({ "user_id": user_id, "bin_id": bin_id, "category": category, "confidence": 0.9 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let user = body_json(get(app.clone(), &format!("/api/v1/users/{user_id}")).await).await;
    // floor(27 * 0.9) + floor(330 * 0.9)
    assert_eq!(user["data"]["points"], 24 + 297);

    let history = body_json(
        get(app.clone(), &format!("/api/v1/users/{user_id}/transactions?limit=1")).await,
    )
    .await;
    let rows = history["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["waste_category"], "Television");

    let response = get(app, "/api/v1/users/9999/transactions").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
