//! Image upload service.
//!
//! Owns the naming and validation policy; bytes go to whatever [`BlobStore`] is injected.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::BlobStore;

/// Prefix under which every uploaded image is stored.
pub const IMAGE_PREFIX: &str = "images";

/// Lowercase extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "svg"];

/// A file submitted alongside a form.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Validates, names and stores uploaded images.
pub struct ImageUploader {
    blobs: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl ImageUploader {
    pub fn new(blobs: Arc<dyn BlobStore>, max_bytes: usize) -> Self {
        Self { blobs, max_bytes }
    }

    /// Store `file` and return its public URL.
    pub async fn upload(&self, file: &ImageFile) -> Result<String, AppError> {
        if file.bytes.is_empty() {
            return Err(AppError::Upload("Uploaded file is empty".to_string()));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(AppError::Upload(format!(
                "Uploaded file is larger than {} bytes",
                self.max_bytes
            )));
        }

        let path = storage_path(&file.file_name)?;
        let url = self.blobs.put(&path, &file.bytes).await.map_err(|e| {
            tracing::error!("Failed to store upload {}: {}", path, e);
            AppError::Upload("Image storage is unavailable".to_string())
        })?;

        tracing::info!("Uploaded image {} ({} bytes)", path, file.bytes.len());
        Ok(url)
    }

    /// Pick the image for a record mutation.
    ///
    /// An uploaded file wins. If its upload fails, a supplied URL is used instead;
    /// with no supplied URL the failure is returned and the mutation must abort.
    pub async fn resolve(
        &self,
        file: Option<&ImageFile>,
        supplied: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let Some(file) = file else {
            return Ok(supplied.map(str::to_string));
        };

        match self.upload(file).await {
            Ok(url) => Ok(Some(url)),
            Err(e) => match supplied {
                Some(url) => {
                    tracing::warn!("Image upload failed ({}), keeping supplied URL {}", e, url);
                    Ok(Some(url.to_string()))
                }
                None => Err(e),
            },
        }
    }
}

/// Whether `resolved` came from uploading `file` rather than from the supplied URL.
pub fn freshly_uploaded(file: Option<&ImageFile>, resolved: &str, supplied: Option<&str>) -> bool {
    file.is_some() && supplied != Some(resolved)
}

/// Blobs are not removed when the record write that references them fails.
pub fn log_orphaned_upload(uploaded: bool, url: &str) {
    if uploaded {
        tracing::warn!("Record write failed, uploaded image {} is orphaned", url);
    }
}

/// `images/<unix-millis>-<8 hex chars>.<ext>`
pub fn storage_path(file_name: &str) -> Result<String, AppError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::Upload("Uploaded file has no extension".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Upload(format!(
            "Unsupported image type .{}; allowed: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let suffix = Uuid::new_v4().simple().to_string();
    Ok(format!(
        "{}/{}-{}.{}",
        IMAGE_PREFIX,
        Utc::now().timestamp_millis(),
        &suffix[..8],
        extension
    ))
}
