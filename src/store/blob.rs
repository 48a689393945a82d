//! Blob storage for uploaded images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::StoreError;

/// Public blob storage: store bytes under a path, get back a reachable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// Blobs written to a local directory that the router serves publicly.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let relative = Path::new(path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StoreError::msg(format!("Refusing blob path {}", path)));
        }

        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::new)?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(StoreError::new)?;

        tracing::debug!("Stored blob {} ({} bytes)", target.display(), bytes.len());
        Ok(format!("{}/{}", self.public_base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(dir.path(), "/media/");

        let url = blobs.put("images/1-abc.png", b"png").await.unwrap();

        assert_eq!(url, "/media/images/1-abc.png");
        let written = std::fs::read(dir.path().join("images/1-abc.png")).unwrap();
        assert_eq!(written, b"png");
    }

    #[tokio::test]
    async fn test_put_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(dir.path(), "/media");

        assert!(blobs.put("../escape.png", b"x").await.is_err());
        assert!(blobs.put("/etc/passwd", b"x").await.is_err());
    }
}
