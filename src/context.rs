use std::sync::Arc;

use crate::config::Config;
use crate::crypto::MessageCipher;
use crate::db::DbPool;
use crate::storage::BlobStore;

/// Shared application state, built once in `main` and cloned into handlers.
/// Components are constructed from explicit config; nothing here reads the
/// environment at request time.
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: DbPool,
    pub cipher: Arc<MessageCipher>,
    pub blob_store: Arc<BlobStore>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db_pool: DbPool, config: Arc<Config>) -> Self {
        let cipher = Arc::new(MessageCipher::new(&config.encryption_key));
        let blob_store = Arc::new(BlobStore::new(config.uploads_dir.clone()));
        Self {
            db_pool,
            cipher,
            blob_store,
            config,
        }
    }
}
