use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

use crate::crypto::CryptoError;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type. Storage and crypto failures surface as 500 with a
/// plain-text description; upload problems are the client's fault and get 400.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("blob storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("upload error: {0}")]
    Upload(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Io(_) | AppError::Crypto(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing description. Server-side failures keep internals out of
    /// the response body.
    fn user_message(&self) -> String {
        match self {
            AppError::Upload(msg) => format!("Upload error: {}", msg),
            AppError::Database(_) => "Error saving message".to_string(),
            AppError::Io(_) => "Error storing file".to_string(),
            AppError::Crypto(_) => "Error processing message".to_string(),
            AppError::Config(_) => "Server misconfigured".to_string(),
        }
    }

    fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();
        (self.status_code(), self.user_message()).into_response()
    }
}
