//! Standalone image upload.

use axum::extract::{Multipart, State};
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::upload::ImageFile;
use crate::AppState;

/// Multipart part carrying the image.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadedImage {
    pub url: String,
}

/// POST /api/admin/upload - Store an image and return its public URL.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(format!("Could not read uploaded file: {}", e)))?;

        let url = state
            .uploader
            .upload(&ImageFile {
                file_name,
                bytes: bytes.to_vec(),
            })
            .await?;
        return success(UploadedImage { url });
    }

    Err(AppError::Upload("No file provided".to_string()))
}
