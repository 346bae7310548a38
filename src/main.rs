use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use murmur_server::config::Config;
use murmur_server::context::AppContext;
use murmur_server::db;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Fails here if the encryption key is missing: the service must not
    // come up in a state where it would store plaintext.
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Murmur Server Starting ===");
    info!(uploads_dir = %config.uploads_dir.display(), "blob storage");

    let db_pool = db::create_pool(&config.database_url)
        .await
        .context("failed to open the record store")?;
    db::run_migrations(&db_pool)
        .await
        .context("failed to run migrations")?;
    info!("record store ready");

    let context = AppContext::new(db_pool, config.clone());
    context
        .blob_store
        .ensure_dir()
        .await
        .context("failed to create the uploads directory")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("listening on {}", config.bind_address);

    murmur_server::serve(context, listener).await?;
    Ok(())
}
