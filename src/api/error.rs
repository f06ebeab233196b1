//! API Error Types
//!
//! Errors produced while talking to the feed backend.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when calling the feed backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network failure before a response was received
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response carrying a JSON `detail`
    #[error("Backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// Non-2xx response without a readable error body
    #[error("Unexpected status {status}")]
    UnexpectedStatus { status: u16 },

    /// 2xx response whose body could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Selected attachment could not be read
    #[error("Cannot read media file {path:?}: {error}")]
    Media { path: PathBuf, error: String },
}

impl ApiError {
    /// Whether the backend answered at all (any HTTP status)
    pub fn has_status(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected { .. } | ApiError::UnexpectedStatus { .. }
        )
    }
}

/// Result type alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;
