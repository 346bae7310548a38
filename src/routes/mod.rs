// ============================================================================
// HTTP Routes
// ============================================================================
//
// - mod.rs: router assembly and middleware
// - messages.rs: message create/list endpoints
// - uploads.rs: stored audio retrieval
// - health.rs: liveness endpoint
//
// ============================================================================

mod health;
mod messages;
mod uploads;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::MAX_AUDIO_FILE_SIZE;
use crate::context::AppContext;

/// Build the application router. CORS is wide open: the browser client is
/// served from elsewhere and the API carries no credentials.
pub fn create_router(context: AppContext) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/messages",
            post(messages::create_text_message).get(messages::list_messages),
        )
        .route("/api/messages/audio", post(messages::create_audio_message))
        .route("/uploads/:filename", get(uploads::download_audio))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .layer(DefaultBodyLimit::max(MAX_AUDIO_FILE_SIZE))
        .with_state(context)
}
