//! Classification adapter.
//!
//! Decodes an uploaded image, prepares the model input tensor, invokes the
//! external [`Classifier`], and normalizes its raw score vector into a
//! [`ClassificationResult`]. Nothing here touches persisted state.

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use image::ImageReader;
use serde::Serialize;

use crate::scoring::{award_points, Confidence};
use crate::waste::{PointsTable, WasteCategory};

/// Model input edge length in pixels.
pub const INPUT_SIZE: u32 = 224;

/// Per-channel means subtracted from BGR pixels (ResNet "caffe" preprocessing).
pub const BGR_CHANNEL_MEANS: [f32; 3] = [103.939, 116.779, 123.68];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    /// The image is missing or cannot be decoded. The caller may resubmit.
    #[error("Invalid image: {0}")]
    Input(String),

    /// The classifier cannot be invoked or returned unusable output.
    #[error("Classifier unavailable: {0}")]
    ModelUnavailable(String),
}

// ---------------------------------------------------------------------------
// Classifier seam
// ---------------------------------------------------------------------------

/// Model input: one `INPUT_SIZE` x `INPUT_SIZE` image, NHWC, BGR, mean-centred.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// `height * width * 3` values, row-major, channels innermost.
    pub pixels: Vec<f32>,
}

impl PreparedImage {
    /// Tensor shaped `[height][width][3]` for JSON inference APIs.
    pub fn to_nested(&self) -> Vec<Vec<[f32; 3]>> {
        self.pixels
            .chunks_exact(3 * self.width as usize)
            .map(|row| {
                row.chunks_exact(3)
                    .map(|px| [px[0], px[1], px[2]])
                    .collect()
            })
            .collect()
    }
}

/// External image classifier.
///
/// Returns one score per [`WasteCategory`], aligned to
/// [`WasteCategory::ALL`]. Implementations must be safe to call
/// concurrently.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn invoke(&self, image: &PreparedImage) -> Result<Vec<f32>, ClassificationError>;

    /// Readiness probe for health reporting.
    async fn ready(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Score for one category in the full distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: WasteCategory,
    pub score: f64,
}

/// Normalized classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: WasteCategory,
    /// The raw winning score, in `[0, 1]`.
    pub confidence: f64,
    pub class_index: usize,
    /// Full distribution, for audit. Not used for scoring.
    pub probabilities: Vec<CategoryScore>,
}

impl ClassificationResult {
    pub fn confidence(&self) -> Confidence {
        Confidence::Known(self.confidence)
    }
}

/// A classification plus the points it would earn as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationPreview {
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub base_points: i32,
    /// Award with no manual override. The deposit itself may differ if the
    /// bin state or the override flag change the outcome.
    pub estimated_points: i32,
}

impl ClassificationPreview {
    pub fn new(classification: ClassificationResult, table: &PointsTable) -> Self {
        let points = table.lookup(classification.category);
        let award = award_points(points, classification.confidence(), false);
        Self {
            base_points: points.base_points,
            estimated_points: award.points,
            classification,
        }
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Decode `bytes` and build the model input tensor.
pub fn prepare_image(bytes: &[u8]) -> Result<PreparedImage, ClassificationError> {
    if bytes.is_empty() {
        return Err(ClassificationError::Input("image is empty".to_string()));
    }

    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ClassificationError::Input(e.to_string()))?
        .decode()
        .map_err(|e| ClassificationError::Input(e.to_string()))?;

    let rgb = image::imageops::resize(
        &decoded.to_rgb8(),
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::CatmullRom,
    );

    let mut pixels = Vec::with_capacity((INPUT_SIZE * INPUT_SIZE * 3) as usize);
    for px in rgb.pixels() {
        let [r, g, b] = px.0;
        pixels.push(f32::from(b) - BGR_CHANNEL_MEANS[0]);
        pixels.push(f32::from(g) - BGR_CHANNEL_MEANS[1]);
        pixels.push(f32::from(r) - BGR_CHANNEL_MEANS[2]);
    }

    Ok(PreparedImage {
        width: INPUT_SIZE,
        height: INPUT_SIZE,
        pixels,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Pick the winning category from a raw score vector.
///
/// Arg-max with NaN never winning; ties keep the lowest index. The winning
/// score is used as-is for confidence. An empty vector, a winner with no
/// category label, or a winning score outside `[0, 1]` means the classifier
/// is not producing usable output.
pub fn normalize_scores(scores: &[f32]) -> Result<ClassificationResult, ClassificationError> {
    let (class_index, top) = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .ok_or_else(|| {
            ClassificationError::ModelUnavailable("classifier returned no scores".to_string())
        })?;

    let category = WasteCategory::from_index(class_index).ok_or_else(|| {
        ClassificationError::ModelUnavailable(format!(
            "classifier returned {} scores but only {} categories are known",
            scores.len(),
            WasteCategory::ALL.len()
        ))
    })?;

    let confidence = f64::from(top);
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ClassificationError::ModelUnavailable(format!(
            "classifier score {confidence} is not a probability"
        )));
    }

    let probabilities = WasteCategory::ALL
        .iter()
        .zip(scores)
        .map(|(&category, &score)| CategoryScore {
            category,
            score: f64::from(score),
        })
        .collect();

    Ok(ClassificationResult {
        category,
        confidence,
        class_index,
        probabilities,
    })
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Runs the full image -> [`ClassificationResult`] path against an injected
/// classifier.
#[derive(Clone)]
pub struct ClassificationAdapter {
    classifier: Arc<dyn Classifier>,
}

impl ClassificationAdapter {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub async fn classify_image(
        &self,
        bytes: &[u8],
    ) -> Result<ClassificationResult, ClassificationError> {
        // Decoding and resizing are CPU-bound; keep them off the async workers.
        let owned = bytes.to_vec();
        let prepared = tokio::task::spawn_blocking(move || prepare_image(&owned))
            .await
            .map_err(|e| {
                ClassificationError::ModelUnavailable(format!("Image preprocessing failed: {e}"))
            })??;
        let scores = self.classifier.invoke(&prepared).await?;
        let result = normalize_scores(&scores)?;
        tracing::debug!(
            category = %result.category,
            confidence = result.confidence,
            "Image classified"
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
