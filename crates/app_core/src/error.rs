//! Application error types

use feed_api::{ApiError, ImageId};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (show message, allow retry) =====
    #[error("Failed to fetch images: {0}")]
    FetchFailure(String),

    #[error("Decoding image {id} timed out after {after_ms} ms")]
    DecodeTimeout { id: ImageId, after_ms: u64 },

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session expired")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),

    // ===== Startup Errors =====
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_))
    }

    /// Can the same request simply be issued again?
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::FetchFailure(_) | AppError::DecodeTimeout { .. })
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FetchFailure(msg) => format!("Failed to fetch images: {}. Try again.", msg),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            AppError::Storage(_) => "Liked photos could not be saved on this device.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound(what) => AppError::NotFound(what),
            ApiError::Unauthorized => AppError::Unauthorized,
            other => AppError::FetchFailure(other.to_string()),
        }
    }
}

impl From<app_db::DbError> for AppError {
    fn from(e: app_db::DbError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::ImageDecode(e.to_string())
    }
}
