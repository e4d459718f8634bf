/// HTTP server setup and routing
use crate::{
    blob_store::URL_PREFIX,
    context::AppContext,
    error::{AeliaError, AeliaResult, ErrorResponse},
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::Json,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let uploads = ServeDir::new(ctx.cards.blobs().location());
    let body_limit = ctx.request_body_limit();

    Router::new()
        .merge(crate::api::routes())
        .with_state(ctx)
        // Read-only blob serving
        .nest_service(URL_PREFIX, uploads)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            ok: false,
            error: "Endpoint not found".to_string(),
        }),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> AeliaResult<()> {
    let addr = ctx.config.bind_address();

    info!("Aelia backend listening on {}", addr);
    info!("   Public URL: {}", ctx.config.service.base_url);
    info!("   Card database: {:?}", ctx.config.storage.db_file);
    info!("   Uploads: {:?}", ctx.config.storage.upload_directory);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AeliaError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AeliaError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
