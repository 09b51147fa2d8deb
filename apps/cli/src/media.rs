use std::path::PathBuf;

use async_trait::async_trait;
use client_core::{ClientError, MediaSource, PermissionStatus};

/// Picks the photo named on the command line. Access is granted only for a
/// readable regular file.
pub struct FileMediaSource {
    path: PathBuf,
}

impl FileMediaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MediaSource for FileMediaSource {
    async fn request_permission(&self) -> PermissionStatus {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => PermissionStatus::Granted,
            _ => PermissionStatus::Denied,
        }
    }

    async fn pick_image(&self) -> Result<Option<Vec<u8>>, ClientError> {
        let bytes = tokio::fs::read(&self.path).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(bytes))
    }
}

/// Used by commands that never upload.
pub struct NoMediaSource;

#[async_trait]
impl MediaSource for NoMediaSource {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn pick_image(&self) -> Result<Option<Vec<u8>>, ClientError> {
        Ok(None)
    }
}
