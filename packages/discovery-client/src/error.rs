//! Error types for the discovery client.

use thiserror::Error;

/// Result type for discovery client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Discovery client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, bad TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the backend.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// 2xx response carrying an `{"error": ...}` payload.
    #[error("Backend error: {0}")]
    Backend(String),
}
