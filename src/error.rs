/// Unified error types for the Aelia card service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the card service
#[derive(Error, Debug)]
pub enum AeliaError {
    /// Malformed submissions
    #[error("Validation error: {0}")]
    Validation(String),

    /// An uploaded file exceeded the per-file cap
    #[error("File too large: field '{field}' exceeds {limit} bytes")]
    PayloadTooLarge { field: String, limit: usize },

    /// Unknown card id
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Barcode rendering errors
    #[error("Barcode generation failed: {0}")]
    Generation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl AeliaError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AeliaError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AeliaError::Validation(_) => StatusCode::BAD_REQUEST,
            AeliaError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AeliaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AeliaError::NotFound(_) => "Card not found".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            ok: false,
            error: message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AeliaResult<T> = Result<T, AeliaError>;
