#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use remat_core::classification::{ClassificationError, Classifier, PreparedImage};
use remat_core::deposit::DepositEngine;
use remat_core::waste::WasteCategory;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use remat_api::config::ServerConfig;
use remat_api::router::build_app_router;
use remat_api::state::AppState;

// ---------------------------------------------------------------------------
// Fake classifier
// ---------------------------------------------------------------------------

/// Classifier stand-in returning fixed scores, or failing on every call.
pub struct FakeClassifier {
    scores: Option<Vec<f32>>,
}

impl FakeClassifier {
    /// Scores `confidence` for `category` and spreads nothing elsewhere.
    pub fn confident(category: WasteCategory, confidence: f32) -> Self {
        let mut scores = vec![0.0; WasteCategory::ALL.len()];
        let index = WasteCategory::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap();
        scores[index] = confidence;
        Self {
            scores: Some(scores),
        }
    }

    /// Fails every call as if the model server were down.
    pub fn offline() -> Self {
        Self { scores: None }
    }
}

#[async_trait::async_trait]
impl Classifier for FakeClassifier {
    async fn invoke(&self, _image: &PreparedImage) -> Result<Vec<f32>, ClassificationError> {
        self.scores
            .clone()
            .ok_or_else(|| ClassificationError::ModelUnavailable("connection refused".into()))
    }

    async fn ready(&self) -> bool {
        self.scores.is_some()
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        classifier_url: "http://127.0.0.1:9".to_string(),
        classifier_model: "ewaste".to_string(),
        classifier_timeout_secs: 1,
        points_table_path: None,
        fill_increment: 10,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Full router with the production middleware stack and a classifier that
/// reports Battery at 0.80.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, FakeClassifier::confident(WasteCategory::Battery, 0.80))
}

/// Full router with the given classifier.
pub fn build_test_app_with(pool: PgPool, classifier: FakeClassifier) -> Router {
    let state = AppState::new(
        pool,
        test_config(),
        Arc::new(classifier),
        DepositEngine::default(),
    );
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::post(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

const BOUNDARY: &str = "remat-test-boundary";

/// POST a multipart form: text `fields`, plus an `image` part if given.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    fields: &[(&str, &str)],
    image: Option<&[u8]>,
) -> Response<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"item.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A small solid-colour PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut png = Vec::new();
    image::DynamicImage::new_rgb8(8, 8)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a bin over HTTP and return its id.
pub async fn create_bin(app: Router, capacity: i32, fill_level: i32, status: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/bins",
        serde_json::json!({
            "name": format!("Bin {capacity}/{fill_level}"),
            "latitude": 12.97,
            "longitude": 77.59,
            "capacity": capacity,
            "fill_level": fill_level,
            "status": status,
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a user over HTTP and return its id.
pub async fn create_user(app: Router, email: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/users",
        serde_json::json!({ "name": "Depositor", "email": email }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
