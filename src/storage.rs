// ============================================================================
// Blob Store - Directory-backed storage for uploaded audio
// ============================================================================
//
// Write-once: a blob is saved under a generated name at upload time and read
// back by that name. The message record is created only after the blob write
// succeeds, so a failed upload leaves no dangling reference.
//
// ============================================================================

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the storage directory. Called once at startup.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Write a blob and return its stored filename. The name is a random
    /// UUID prefix plus the sanitized original filename, so two uploads of
    /// the same file in the same instant still get distinct names.
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        let stored_name = format!(
            "{}-{}",
            Uuid::new_v4(),
            sanitize_filename(original_filename)
        );
        let path = self.dir.join(&stored_name);

        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(stored_name)
    }

    /// Read a stored blob back. Names containing path separators or parent
    /// components are rejected before touching the filesystem.
    pub async fn read(&self, stored_name: &str) -> std::io::Result<Vec<u8>> {
        if !is_safe_name(stored_name) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "invalid blob name",
            ));
        }
        fs::read(self.dir.join(stored_name)).await
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && name != "."
        && name != ".."
}

/// Keep only the final path component of a client-supplied filename and
/// replace characters that are unsafe in a URL path segment.
fn sanitize_filename(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("blob");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "blob".to_string()
    } else {
        cleaned
    }
}
