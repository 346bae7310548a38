use axum::{
    extract::{Host, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::context::AppContext;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::message::{MessageBody, MessageView};

#[derive(Debug, Deserialize)]
pub struct CreateTextRequest {
    pub text: String,
}

/// POST /api/messages
///
/// Encrypts the text and appends a message record. The plaintext is stored
/// as given; trimming and emptiness checks belong to the client.
pub async fn create_text_message(
    State(context): State<AppContext>,
    Json(request): Json<CreateTextRequest>,
) -> AppResult<impl IntoResponse> {
    let ciphertext = context.cipher.encrypt(&request.text)?;
    db::insert_text_message(&context.db_pool, &ciphertext).await?;
    Ok((StatusCode::CREATED, "Message saved"))
}

/// POST /api/messages/audio
///
/// Multipart upload, field `audio`. The blob is written first; the message
/// record is only created once the bytes are on disk, so a failed write
/// never leaves a record pointing at nothing.
pub async fn create_audio_message(
    State(context): State<AppContext>,
    Host(host): Host,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut audio_bytes = None;
    let mut original_filename = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("audio") {
            original_filename = field.file_name().map(|s| s.to_string());
            audio_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("failed to read audio field: {}", e)))?,
            );
        }
    }

    let bytes = audio_bytes.ok_or_else(|| AppError::Upload("missing `audio` field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Upload("audio payload is empty".to_string()));
    }
    let filename = original_filename.unwrap_or_else(|| "audio".to_string());

    let stored_name = context.blob_store.save(&filename, &bytes).await?;
    let audio_url = format!("{}/uploads/{}", base_url(&context, &host), stored_name);
    db::insert_audio_message(&context.db_pool, &audio_url).await?;

    tracing::info!(
        stored_name = %stored_name,
        size_bytes = bytes.len(),
        "audio message saved"
    );

    Ok((StatusCode::CREATED, "Audio message saved"))
}

/// GET /api/messages
///
/// Full listing in creation order, text already decrypted. A record that
/// fails decryption is logged and omitted; one bad row never takes down the
/// whole listing.
pub async fn list_messages(
    State(context): State<AppContext>,
) -> AppResult<Json<Vec<MessageView>>> {
    let stored = db::list_messages(&context.db_pool).await?;

    let mut views = Vec::with_capacity(stored.len());
    for message in stored {
        match message.body {
            MessageBody::Text { ciphertext } => match context.cipher.decrypt(&ciphertext) {
                Ok(plaintext) => views.push(MessageView::text(plaintext, message.timestamp)),
                Err(error) => {
                    tracing::warn!(
                        message_id = message.id,
                        error = %error,
                        "skipping message that failed to decrypt"
                    );
                }
            },
            MessageBody::Audio { audio_url } => {
                views.push(MessageView::audio(audio_url, message.timestamp));
            }
        }
    }

    Ok(Json(views))
}

/// Audio links are absolute. Behind a proxy the configured public base URL
/// wins; otherwise the request's own Host header is used, like the source
/// system did.
fn base_url(context: &AppContext, host: &str) -> String {
    match &context.config.public_base_url {
        Some(base) => base.clone(),
        None => format!("http://{}", host),
    }
}
