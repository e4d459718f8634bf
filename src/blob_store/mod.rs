/// Blob Storage System
///
/// Stores uploaded images and generated barcodes under unique file names
/// and hands out relative paths that the static file server exposes.
pub mod disk;
pub mod models;

pub use disk::DiskBlobBackend;
pub use models::Upload;

use crate::error::{AeliaError, AeliaResult};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

/// URL prefix under which the blob directory is served
pub const URL_PREFIX: &str = "/static/uploads";

/// Blob storage backend trait
///
/// Implementations handle the actual storage and retrieval of blob data.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store a blob under `name`; fails if the name is already taken
    async fn put(&self, name: &str, data: &[u8]) -> AeliaResult<()>;
}

/// Configuration for blob storage
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    /// Directory holding every blob
    pub location: PathBuf,

    /// Public URL prepended to relative paths
    pub base_url: String,

    /// Maximum upload size in bytes (default: 8MiB)
    pub max_blob_size: usize,
}

/// Blob store manager
#[derive(Clone)]
pub struct BlobStore {
    config: BlobStoreConfig,
    backend: Arc<dyn BlobBackend>,
}

impl BlobStore {
    /// Create a blob store backed by the configured directory
    pub fn new(config: BlobStoreConfig) -> Self {
        let backend: Arc<dyn BlobBackend> =
            Arc::new(DiskBlobBackend::new(config.location.clone()));
        Self { config, backend }
    }

    pub fn location(&self) -> &PathBuf {
        &self.config.location
    }

    /// Reject sizes above the per-upload cap
    pub fn check_size(&self, field: &str, size: usize) -> AeliaResult<()> {
        if size > self.config.max_blob_size {
            return Err(AeliaError::PayloadTooLarge {
                field: field.to_string(),
                limit: self.config.max_blob_size,
            });
        }
        Ok(())
    }

    /// Store a client upload under a fresh name and return its relative path
    pub async fn put(&self, upload: &Upload) -> AeliaResult<String> {
        self.check_size(&upload.field, upload.size())?;

        let name = format!(
            "{}-{}{}",
            Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4(),
            upload.extension
        );
        self.backend.put(&name, &upload.data).await?;

        tracing::debug!("Stored {} upload as {} ({} bytes)", upload.field, name, upload.size());

        Ok(relative_path(&name))
    }

    /// Store generated content as `<millis>-<stem><extension>`
    pub async fn put_generated(
        &self,
        stem: &str,
        data: &[u8],
        extension: &str,
    ) -> AeliaResult<String> {
        let name = format!("{}-{}{}", Utc::now().timestamp_millis(), stem, extension);
        self.backend.put(&name, data).await?;

        tracing::debug!("Stored generated blob {} ({} bytes)", name, data.len());

        Ok(relative_path(&name))
    }

    /// Turn a relative path into an absolute URL
    pub fn resolve(&self, relative: &str) -> String {
        format!("{}{}", self.config.base_url, relative)
    }
}

fn relative_path(name: &str) -> String {
    format!("{}/{}", URL_PREFIX, name)
}
