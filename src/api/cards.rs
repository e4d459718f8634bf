/// Card endpoints: create, list, fetch and delete
use crate::{
    blob_store::Upload,
    cards::{CardFields, CardUploads, CreatedCard, FILE_FIELDS, TEXT_FIELDS},
    context::AppContext,
    error::{AeliaError, AeliaResult},
    record_store::Card,
};
use axum::{
    extract::{multipart::Field, FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::json;

/// Build card routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/cards", get(list_cards).post(create_card))
        .route("/api/cards/:id", get(get_card).delete(delete_card))
}

#[derive(Debug, Serialize)]
struct CreateCardResponse {
    ok: bool,
    #[serde(flatten)]
    created: CreatedCard,
}

#[derive(Debug, Serialize)]
struct DeleteCardResponse {
    ok: bool,
    deleted: Card,
}

/// Create a card from a multipart, JSON or urlencoded submission
async fn create_card(
    State(ctx): State<AppContext>,
    request: Request,
) -> AeliaResult<Json<CreateCardResponse>> {
    let (fields, uploads) = read_submission(&ctx, request).await?;
    let created = ctx.cards.create_card(fields, uploads).await?;

    Ok(Json(CreateCardResponse { ok: true, created }))
}

/// List every card as stored
async fn list_cards(State(ctx): State<AppContext>) -> Json<Vec<Card>> {
    Json(ctx.cards.list_cards().await)
}

/// Fetch one card with absolute asset URLs
async fn get_card(State(ctx): State<AppContext>, Path(id): Path<String>) -> Response {
    match ctx.cards.get_card(&id).await {
        Ok(card) => Json(card).into_response(),
        Err(AeliaError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Card not found" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete one card
async fn delete_card(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> AeliaResult<Json<DeleteCardResponse>> {
    let deleted = ctx.cards.delete_card(&id).await?;
    Ok(Json(DeleteCardResponse { ok: true, deleted }))
}

/// Split a request body into text fields and file uploads
async fn read_submission(
    ctx: &AppContext,
    request: Request,
) -> AeliaResult<(CardFields, CardUploads)> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AeliaError::Validation(e.body_text()))?;
        return read_multipart(multipart, ctx.config.service.upload_limit).await;
    }

    if content_type.starts_with("application/json") {
        let Json(fields) = Json::<CardFields>::from_request(request, &())
            .await
            .map_err(|e| AeliaError::Validation(e.body_text()))?;
        return Ok((fields, CardUploads::default()));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<CardFields>::from_request(request, &())
            .await
            .map_err(|e| AeliaError::Validation(e.body_text()))?;
        return Ok((fields, CardUploads::default()));
    }

    Ok((CardFields::default(), CardUploads::default()))
}

async fn read_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> AeliaResult<(CardFields, CardUploads)> {
    let mut fields = CardFields::default();
    let mut uploads = CardUploads::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if FILE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().map(str::to_string);
            let data = read_capped(&mut field, &name, limit).await?;

            // Browsers send an empty part for an unselected file input
            if data.is_empty() {
                continue;
            }

            if let Some(slot) = uploads.slot_mut(&name) {
                if slot.is_some() {
                    return Err(AeliaError::Validation(format!(
                        "Only one file is allowed for field '{}'",
                        name
                    )));
                }
                *slot = Some(Upload::new(name.as_str(), file_name.as_deref(), data));
            }
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await.map_err(multipart_error)?;
            fields.set(&name, value);
        } else {
            tracing::debug!("Ignoring unknown form field {}", name);
        }
    }

    Ok((fields, uploads))
}

/// Buffer one file field, failing as soon as it exceeds `limit`
async fn read_capped(field: &mut Field<'_>, name: &str, limit: usize) -> AeliaResult<Vec<u8>> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > limit {
            return Err(AeliaError::PayloadTooLarge {
                field: name.to_string(),
                limit,
            });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AeliaError {
    AeliaError::Validation(e.body_text())
}
