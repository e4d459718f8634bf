/// Blob storage data models
use std::path::Path;

/// Longest extension kept from an uploaded file name
const MAX_EXTENSION_LEN: usize = 10;

/// A file received from a client, not yet written to disk
#[derive(Debug, Clone)]
pub struct Upload {
    /// Form field the file arrived in (`photo`, `signature`, ...)
    pub field: String,
    /// Sanitised extension including the leading dot, or empty
    pub extension: String,
    pub data: Vec<u8>,
}

impl Upload {
    /// Create an upload, deriving the extension from the client's file name
    pub fn new(field: impl Into<String>, file_name: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            extension: file_name.map(extension_of).unwrap_or_default(),
            data,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Extract a safe `.ext` from a client-supplied file name
///
/// Only short ASCII-alphanumeric extensions survive; anything else yields
/// an empty string so the stored name stays inside the blob directory.
pub fn extension_of(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return String::new();
    }

    format!(".{}", ext.to_ascii_lowercase())
}
