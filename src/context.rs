/// Application context and dependency injection
use crate::{
    barcode::{BarcodeRenderer, Code128Renderer},
    blob_store::{BlobStore, BlobStoreConfig},
    cards::CardService,
    config::ServerConfig,
    error::{AeliaError, AeliaResult},
    record_store::RecordStore,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub cards: Arc<CardService>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AeliaResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let records = RecordStore::open(config.storage.db_file.clone()).await?;

        let blobs = BlobStore::new(BlobStoreConfig {
            location: config.storage.upload_directory.clone(),
            base_url: config.service.base_url.clone(),
            max_blob_size: config.service.upload_limit,
        });

        let renderer: Arc<dyn BarcodeRenderer> = Arc::new(Code128Renderer::new());

        let cards = Arc::new(CardService::new(
            records,
            blobs,
            renderer,
            config.barcode.fallback_prefix.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            cards,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> AeliaResult<()> {
        let dirs = [
            &config.storage.data_directory,
            &config.storage.upload_directory,
        ];

        for dir in dirs {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AeliaError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    /// Per-request body cap: four full uploads plus room for text fields
    pub fn request_body_limit(&self) -> usize {
        self.config.service.upload_limit * 4 + 1024 * 1024
    }
}
