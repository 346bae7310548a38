// ============================================================================
// Murmur Server Library
// ============================================================================
//
// Small message-store service: text messages encrypted at rest, audio
// messages stored as uploaded blobs, everything listed back in creation
// order over a JSON API.
//
// ============================================================================

pub mod config;
pub mod context;
pub mod crypto;
pub mod db;
pub mod error;
pub mod message;
pub mod routes;
pub mod storage;

use tokio::net::TcpListener;

use crate::context::AppContext;

/// Serve the application on an already-bound listener. Split out of `main`
/// so integration tests can spawn the real router on an ephemeral port.
pub async fn serve(context: AppContext, listener: TcpListener) -> std::io::Result<()> {
    let app = routes::create_router(context);
    axum::serve(listener, app).await
}
