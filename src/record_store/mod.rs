/// Record Store
///
/// Persists every card as one pretty-printed JSON array on disk. Each
/// operation reads or rewrites the whole file; there is no index.
pub mod models;

pub use models::Card;

use crate::error::AeliaResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Flat-file card store
#[derive(Clone)]
pub struct RecordStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    /// Open the store at `path`, creating an empty array file if none exists
    pub async fn open(path: impl Into<PathBuf>) -> AeliaResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        if fs::metadata(&path).await.is_err() {
            fs::write(&path, b"[]").await?;
            tracing::info!("Created empty card database at {:?}", path);
        }

        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Read all cards
    ///
    /// Read and parse failures yield an empty list rather than an error.
    pub async fn load(&self) -> Vec<Card> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read card database {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str(&raw) {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!("Failed to parse card database {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the store with `records`
    pub async fn save(&self, records: &[Card]) -> AeliaResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_records(records).await
    }

    /// Add one card to the end of the store
    pub async fn append(&self, record: Card) -> AeliaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        records.push(record);
        self.write_records(&records).await
    }

    /// Find a card by id
    pub async fn find_by_id(&self, id: &str) -> Option<Card> {
        self.load().await.into_iter().find(|card| card.id == id)
    }

    /// Remove a card by id, returning it if it existed
    pub async fn delete_by_id(&self, id: &str) -> AeliaResult<Option<Card>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;

        let Some(index) = records.iter().position(|card| card.id == id) else {
            return Ok(None);
        };

        let removed = records.remove(index);
        self.write_records(&records).await?;

        Ok(Some(removed))
    }

    /// Write through a sibling temp file so the store is never half-written
    async fn write_records(&self, records: &[Card]) -> AeliaResult<()> {
        let json = serde_json::to_vec_pretty(records)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}
