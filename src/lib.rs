/// Aelia ID - ID card generation backend
///
/// Persists card records in a flat JSON file, stores uploaded images and
/// generated Code128 barcodes on disk, and serves both over a small REST API.
pub mod api;
pub mod barcode;
pub mod blob_store;
pub mod cards;
pub mod config;
pub mod context;
pub mod error;
pub mod record_store;
pub mod server;
