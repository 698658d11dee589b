//! REST client for the model server.
//!
//! Speaks the TensorFlow Serving REST API: `POST /v1/models/{model}:predict`
//! for inference and `GET /v1/models/{model}` for readiness.

use std::time::Duration;

use remat_core::classification::{ClassificationError, Classifier, PreparedImage};
use serde::{Deserialize, Serialize};

/// HTTP client for one served model.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

/// Errors from the model server REST layer.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The model server returned a non-2xx status code.
    #[error("Model server error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed but did not contain a prediction.
    #[error("Malformed model server response: {0}")]
    Malformed(String),
}

impl From<InferenceError> for ClassificationError {
    fn from(err: InferenceError) -> Self {
        ClassificationError::ModelUnavailable(err.to_string())
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [&'a Vec<Vec<[f32; 3]>>; 1],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ModelStatusResponse {
    #[serde(default)]
    model_version_status: Vec<ModelVersionStatus>,
}

#[derive(Debug, Deserialize)]
struct ModelVersionStatus {
    state: String,
}

impl InferenceClient {
    /// Create a client with its own connection pool.
    ///
    /// * `base_url` - Model server root, e.g. `http://localhost:8501`.
    /// * `model` - Served model name.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, model))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Run the model on one prepared image and return its raw scores.
    pub async fn predict(&self, image: &PreparedImage) -> Result<Vec<f32>, InferenceError> {
        let tensor = image.to_nested();
        let body = PredictRequest {
            instances: [&tensor],
        };

        let response = self
            .client
            .post(format!("{}/v1/models/{}:predict", self.base_url, self.model))
            .json(&body)
            .send()
            .await?;

        let parsed: PredictResponse = Self::parse_response(response).await?;
        first_prediction(parsed)
    }

    /// Whether at least one version of the model reports `AVAILABLE`.
    pub async fn model_ready(&self) -> Result<bool, InferenceError> {
        let response = self
            .client
            .get(format!("{}/v1/models/{}", self.base_url, self.model))
            .send()
            .await?;

        let status: ModelStatusResponse = Self::parse_response(response).await?;
        Ok(status
            .model_version_status
            .iter()
            .any(|v| v.state.eq_ignore_ascii_case("AVAILABLE")))
    }

    // ---- private helpers ----

    /// Parse a successful JSON response, or capture status and body text.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

fn first_prediction(response: PredictResponse) -> Result<Vec<f32>, InferenceError> {
    response
        .predictions
        .into_iter()
        .next()
        .filter(|scores| !scores.is_empty())
        .ok_or_else(|| InferenceError::Malformed("no predictions returned".to_string()))
}

#[async_trait::async_trait]
impl Classifier for InferenceClient {
    async fn invoke(&self, image: &PreparedImage) -> Result<Vec<f32>, ClassificationError> {
        self.predict(image).await.map_err(|e| {
            tracing::error!(error = %e, model = %self.model, "Inference request failed");
            ClassificationError::from(e)
        })
    }

    async fn ready(&self) -> bool {
        match self.model_ready().await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "Model readiness probe failed");
                false
            }
        }
    }
}
