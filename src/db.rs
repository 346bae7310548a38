use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::message::{MessageBody, StoredMessage};

pub type DbPool = Pool<Sqlite>;

/// Open the record store, creating the database file if it does not exist.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    text: Option<String>,
    audio_url: Option<String>,
    timestamp: DateTime<Utc>,
}

impl MessageRow {
    fn into_stored(self) -> Option<StoredMessage> {
        let body = match (self.text, self.audio_url) {
            (Some(ciphertext), None) => MessageBody::Text { ciphertext },
            (None, Some(audio_url)) => MessageBody::Audio { audio_url },
            // The schema CHECK forbids this; a row can only get here through
            // out-of-band edits.
            _ => {
                tracing::warn!(message_id = self.id, "message row violates text/audio invariant");
                return None;
            }
        };
        Some(StoredMessage {
            id: self.id,
            body,
            timestamp: self.timestamp,
        })
    }
}

/// Append a text message. `ciphertext` must already be encrypted; this layer
/// never sees plaintext.
pub async fn insert_text_message(pool: &DbPool, ciphertext: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO messages (text, timestamp) VALUES (?1, ?2)")
        .bind(ciphertext)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Append an audio message referencing an already-written blob.
pub async fn insert_audio_message(pool: &DbPool, audio_url: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO messages (audio_url, timestamp) VALUES (?1, ?2)")
        .bind(audio_url)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch every message in insertion order. The autoincrement id is the sort
/// key; timestamps are monotonic but not unique.
pub async fn list_messages(pool: &DbPool) -> Result<Vec<StoredMessage>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT id, text, audio_url, timestamp FROM messages ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(MessageRow::into_stored).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each in-memory SQLite connection is its own database, so a pooled
    // in-memory URL would not share state. Use a throwaway file instead.
    async fn test_pool() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn inserts_come_back_in_order() {
        let (_dir, pool) = test_pool().await;
        insert_text_message(&pool, "ct-1").await.unwrap();
        insert_audio_message(&pool, "http://host/uploads/a.wav")
            .await
            .unwrap();
        insert_text_message(&pool, "ct-2").await.unwrap();

        let messages = list_messages(&pool).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0].body,
            MessageBody::Text {
                ciphertext: "ct-1".to_string()
            }
        );
        assert_eq!(
            messages[1].body,
            MessageBody::Audio {
                audio_url: "http://host/uploads/a.wav".to_string()
            }
        );
        assert_eq!(
            messages[2].body,
            MessageBody::Text {
                ciphertext: "ct-2".to_string()
            }
        );
        assert!(messages[0].timestamp <= messages[1].timestamp);
        assert!(messages[1].timestamp <= messages[2].timestamp);
    }

    #[tokio::test]
    async fn schema_rejects_row_with_both_kinds() {
        let (_dir, pool) = test_pool().await;
        let result = sqlx::query(
            "INSERT INTO messages (text, audio_url, timestamp) VALUES ('ct', 'url', ?1)",
        )
        .bind(Utc::now())
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn schema_rejects_row_with_neither_kind() {
        let (_dir, pool) = test_pool().await;
        let result = sqlx::query("INSERT INTO messages (timestamp) VALUES (?1)")
            .bind(Utc::now())
            .execute(&pool)
            .await;
        assert!(result.is_err());
    }
}
