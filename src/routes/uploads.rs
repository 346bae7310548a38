use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::context::AppContext;
use crate::error::AppResult;

/// GET /uploads/{filename}
///
/// Raw bytes of a previously uploaded audio blob.
pub async fn download_audio(
    State(context): State<AppContext>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let bytes = match context.blob_store.read(&filename).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((StatusCode::NOT_FOUND, "Not found").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        Body::from(bytes),
    )
        .into_response())
}

/// Content type from the stored extension. Uploads are audio in practice,
/// but nothing enforces it, hence the octet-stream fallback.
fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_audio_extensions_map_to_audio_types() {
        assert_eq!(content_type_for("abc-clip.wav"), "audio/wav");
        assert_eq!(content_type_for("abc-clip.webm"), "audio/webm");
        assert_eq!(content_type_for("abc-clip.mp3"), "audio/mpeg");
    }

    #[test]
    fn unknown_extensions_fall_back_to_octet_stream() {
        assert_eq!(content_type_for("abc-clip.xyz"), "application/octet-stream");
        assert_eq!(content_type_for("no-extension"), "application/octet-stream");
    }
}
