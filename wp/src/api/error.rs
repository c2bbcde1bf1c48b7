//! API error types

use thiserror::Error;

/// Errors that can occur while talking to the agent service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Service error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Check if a manual retry of the same request could succeed
    ///
    /// Nothing is retried automatically; this only informs how the failure
    /// is presented to the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Network(_) => true,
            ApiError::Json(_) => false,
            ApiError::InvalidResponse(_) => false,
        }
    }
}
