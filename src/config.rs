use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://murmur.db?mode=rwc";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_RUST_LOG: &str = "murmur_server=info,tower_http=info";

/// Upper bound for a single audio upload (request body limit on the
/// multipart endpoint).
pub const MAX_AUDIO_FILE_SIZE: usize = 25 * 1024 * 1024; // 25 MB

/// Symmetric key length for the message cipher (ChaCha20-Poly1305).
pub const ENCRYPTION_KEY_LEN: usize = 32;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Process-wide configuration, built once at startup and passed into the
/// components that need it. Request handlers never read the environment.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    pub uploads_dir: PathBuf,
    /// Optional external base URL for audio links (e.g. behind a proxy).
    /// When unset, audio URLs are derived from the request's Host header.
    pub public_base_url: Option<String>,
    pub encryption_key: [u8; ENCRYPTION_KEY_LEN],
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails if `ENCRYPTION_KEY` is missing: starting without a key would
    /// mean storing plaintext, which the service must never do.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let uploads_dir = std::env::var("UPLOADS_DIR")
            .unwrap_or_else(|_| DEFAULT_UPLOADS_DIR.to_string())
            .into();

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string());

        let raw_key = std::env::var("ENCRYPTION_KEY")
            .context("ENCRYPTION_KEY must be set (refusing to store plaintext)")?;
        let encryption_key = parse_encryption_key(&raw_key)?;

        let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.to_string());

        Ok(Self {
            port,
            bind_address: format!("0.0.0.0:{}", port),
            database_url,
            uploads_dir,
            public_base_url,
            encryption_key,
            rust_log,
        })
    }
}

/// Accepts either base64 of exactly 32 bytes, or an arbitrary passphrase
/// which is digested to 32 bytes with SHA-256.
fn parse_encryption_key(raw: &str) -> Result<[u8; ENCRYPTION_KEY_LEN]> {
    if raw.trim().is_empty() {
        bail!("ENCRYPTION_KEY is empty");
    }

    if let Ok(bytes) = BASE64.decode(raw) {
        if bytes.len() == ENCRYPTION_KEY_LEN {
            let mut key = [0u8; ENCRYPTION_KEY_LEN];
            key.copy_from_slice(&bytes);
            return Ok(key);
        }
    }

    // Passphrase form
    let digest = Sha256::digest(raw.as_bytes());
    Ok(digest.into())
}

// Keep the key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("uploads_dir", &self.uploads_dir)
            .field("public_base_url", &self.public_base_url)
            .field("encryption_key", &"[redacted]")
            .field("rust_log", &self.rust_log)
            .finish()
    }
}
