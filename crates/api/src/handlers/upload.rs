//! Multipart form reading for image uploads.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use remat_core::classification::ClassificationError;

use crate::error::{AppError, AppResult};

/// Form field carrying the image file.
pub const IMAGE_FIELD: &str = "image";

/// A parsed upload: the image bytes plus any text fields.
#[derive(Debug, Default)]
pub struct ImageUpload {
    pub image: Option<Bytes>,
    pub fields: HashMap<String, String>,
}

impl ImageUpload {
    /// Drain a multipart body. The last `image` part wins.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut upload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                upload.image = Some(data);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                upload.fields.insert(name, text);
            }
        }

        Ok(upload)
    }

    /// The image bytes, or an input error if none were sent.
    pub fn image(&self) -> Result<&[u8], ClassificationError> {
        match &self.image {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(ClassificationError::Input(format!(
                "missing '{IMAGE_FIELD}' file"
            ))),
        }
    }

    /// A required text field parsed as `T`.
    pub fn parse_field<T: std::str::FromStr>(&self, name: &str) -> AppResult<T> {
        let raw = self
            .fields
            .get(name)
            .ok_or_else(|| AppError::BadRequest(format!("missing '{name}' field")))?;
        raw.trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid '{name}' field: {raw}")))
    }
}
