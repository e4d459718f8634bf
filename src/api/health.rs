/// Liveness endpoint
use crate::context::AppContext;
use axum::{routing::get, Router};

/// Body returned by the liveness check
pub const LIVENESS_MESSAGE: &str = "Aelia backend running ✔";

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/", get(liveness))
}

/// Plain-text liveness check
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}
