/// Card Service
///
/// Orchestrates card creation across the blob store, the barcode renderer
/// and the record store, and rewrites stored asset paths to public URLs.
pub mod models;

pub use models::{CardFields, CardUploads, CardUrls, CreatedCard, FILE_FIELDS, TEXT_FIELDS};

use crate::{
    barcode::BarcodeRenderer,
    blob_store::{BlobStore, Upload},
    error::{AeliaError, AeliaResult},
    record_store::{Card, RecordStore},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Card service
#[derive(Clone)]
pub struct CardService {
    records: RecordStore,
    blobs: BlobStore,
    renderer: Arc<dyn BarcodeRenderer>,
    fallback_prefix: String,
}

impl CardService {
    pub fn new(
        records: RecordStore,
        blobs: BlobStore,
        renderer: Arc<dyn BarcodeRenderer>,
        fallback_prefix: impl Into<String>,
    ) -> Self {
        Self {
            records,
            blobs,
            renderer,
            fallback_prefix: fallback_prefix.into(),
        }
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Payload encoded into the barcode of card `id`
    pub fn barcode_payload(&self, idnum: &str, id: &str) -> String {
        if idnum.is_empty() {
            format!("{}-{}", self.fallback_prefix, id)
        } else {
            idnum.to_string()
        }
    }

    /// Create a card from a submission
    ///
    /// Any failure aborts the whole operation. Blobs written before the
    /// failure stay on disk.
    pub async fn create_card(
        &self,
        fields: CardFields,
        uploads: CardUploads,
    ) -> AeliaResult<CreatedCard> {
        let id = Uuid::new_v4().to_string();

        let all_uploads = [
            &uploads.photo,
            &uploads.signature,
            &uploads.logo,
            &uploads.scanner,
        ];
        for upload in all_uploads.iter().copied().flatten() {
            self.blobs.check_size(&upload.field, upload.size())?;
        }

        let photo = self.store_optional(&uploads.photo).await?;
        let signature = self.store_optional(&uploads.signature).await?;
        let logo = self.store_optional(&uploads.logo).await?;
        let scanner = self.store_optional(&uploads.scanner).await?;

        let payload = self.barcode_payload(&fields.idnum, &id);
        let png = self.renderer.render(&payload)?;
        let barcode = self
            .blobs
            .put_generated(&format!("{}-barcode", id), &png, ".png")
            .await?;

        let CardFields {
            name,
            position,
            idnum,
            dob,
            phone,
            email,
            issuedate,
            expirydate,
        } = fields;

        let card = Card {
            id,
            name,
            position,
            idnum,
            dob,
            phone,
            email,
            issuedate,
            expirydate,
            photo,
            signature,
            logo,
            scanner,
            barcode,
            created_at: Utc::now(),
        };

        self.records.append(card.clone()).await?;

        tracing::info!("Created card {} (barcode payload {:?})", card.id, payload);

        let urls = CardUrls::from_resolved(&self.resolve_assets(&card));
        Ok(CreatedCard { card, urls })
    }

    /// All cards with relative asset paths
    pub async fn list_cards(&self) -> Vec<Card> {
        self.records.load().await
    }

    /// One card with asset paths rewritten to absolute URLs
    pub async fn get_card(&self, id: &str) -> AeliaResult<Card> {
        let card = self
            .records
            .find_by_id(id)
            .await
            .ok_or_else(|| AeliaError::NotFound(format!("Card not found: {}", id)))?;

        Ok(self.resolve_assets(&card))
    }

    /// Delete a card; its blobs are left in place
    pub async fn delete_card(&self, id: &str) -> AeliaResult<Card> {
        let removed = self
            .records
            .delete_by_id(id)
            .await?
            .ok_or_else(|| AeliaError::NotFound(format!("Card not found: {}", id)))?;

        tracing::info!("Deleted card {}", removed.id);

        Ok(removed)
    }

    fn resolve_assets(&self, card: &Card) -> Card {
        card.with_resolved_assets(|path| self.blobs.resolve(path))
    }

    async fn store_optional(&self, upload: &Option<Upload>) -> AeliaResult<String> {
        match upload {
            Some(upload) => self.blobs.put(upload).await,
            None => Ok(String::new()),
        }
    }
}
