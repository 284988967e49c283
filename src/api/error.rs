use thiserror::Error;

/// Errors from the notification endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Server rejected the request: {0}")]
    Rejected(String),

    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

impl ApiError {
    /// Whether retrying the same request later can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => *status >= 500 || *status == 429,
            ApiError::Rejected(_) | ApiError::Decode { .. } => false,
        }
    }
}
