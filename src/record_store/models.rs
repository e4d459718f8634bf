/// Card record data models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted ID card
///
/// Asset fields hold either an empty string or a relative path into the
/// blob store (`/static/uploads/<name>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub idnum: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub issuedate: String,
    #[serde(default)]
    pub expirydate: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub scanner: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Copy of this card with every non-empty asset path passed through `resolve`
    pub fn with_resolved_assets<F>(&self, resolve: F) -> Card
    where
        F: Fn(&str) -> String,
    {
        let map = |path: &str| {
            if path.is_empty() {
                String::new()
            } else {
                resolve(path)
            }
        };

        Card {
            photo: map(&self.photo),
            signature: map(&self.signature),
            logo: map(&self.logo),
            scanner: map(&self.scanner),
            barcode: map(&self.barcode),
            ..self.clone()
        }
    }
}
