/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{AeliaError, AeliaResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Disk storage backend
///
/// Stores every blob as a flat file directly under the base path, which is
/// also the directory served at the static uploads prefix.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the file path for a blob name
    fn get_blob_path(&self, name: &str) -> AeliaResult<PathBuf> {
        if name.is_empty() || name.contains(|c| c == '/' || c == '\\') || name.starts_with('.') {
            return Err(AeliaError::Validation(format!("Invalid blob name: {}", name)));
        }
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(&self, name: &str, data: &[u8]) -> AeliaResult<()> {
        let blob_path = self.get_blob_path(name)?;
        fs::create_dir_all(&self.base_path).await?;

        // create_new: an existing blob is never overwritten
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&blob_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(())
    }
}
