/// Card submission and response models
use crate::{blob_store::Upload, record_store::Card};
use serde::{Deserialize, Serialize};

/// Names of the text fields accepted on submission
pub const TEXT_FIELDS: [&str; 8] = [
    "name",
    "position",
    "idnum",
    "dob",
    "phone",
    "email",
    "issuedate",
    "expirydate",
];

/// Names of the file fields accepted on submission
pub const FILE_FIELDS: [&str; 4] = ["photo", "signature", "logo", "scanner"];

/// Text fields of a submission; absent fields default to ""
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFields {
    pub name: String,
    pub position: String,
    pub idnum: String,
    pub dob: String,
    pub phone: String,
    pub email: String,
    pub issuedate: String,
    pub expirydate: String,
}

impl CardFields {
    /// Set a text field by form name; unknown names are ignored
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "position" => &mut self.position,
            "idnum" => &mut self.idnum,
            "dob" => &mut self.dob,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "issuedate" => &mut self.issuedate,
            "expirydate" => &mut self.expirydate,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// File fields of a submission
#[derive(Debug, Clone, Default)]
pub struct CardUploads {
    pub photo: Option<Upload>,
    pub signature: Option<Upload>,
    pub logo: Option<Upload>,
    pub scanner: Option<Upload>,
}

impl CardUploads {
    /// Mutable slot for a file field, if the name is known
    pub fn slot_mut(&mut self, field: &str) -> Option<&mut Option<Upload>> {
        match field {
            "photo" => Some(&mut self.photo),
            "signature" => Some(&mut self.signature),
            "logo" => Some(&mut self.logo),
            "scanner" => Some(&mut self.scanner),
            _ => None,
        }
    }
}

/// Absolute asset URLs returned after creation; "" for absent assets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardUrls {
    pub photo: String,
    pub signature: String,
    pub logo: String,
    pub scanner: String,
    pub barcode: String,
}

impl CardUrls {
    pub fn from_resolved(card: &Card) -> Self {
        Self {
            photo: card.photo.clone(),
            signature: card.signature.clone(),
            logo: card.logo.clone(),
            scanner: card.scanner.clone(),
            barcode: card.barcode.clone(),
        }
    }
}

/// Result of a successful creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCard {
    pub card: Card,
    pub urls: CardUrls,
}
