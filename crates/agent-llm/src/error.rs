//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
///
/// The `Display` text is what callers surface to end users, so variants keep
/// the remote body where one was returned.
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP transport error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

impl LLMError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed(_) => "request_failed",
            Self::AuthenticationFailed => "authentication",
            Self::RateLimitExceeded(_) => "rate_limited",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ModelNotFound(_) => "model_not_found",
            Self::SerializationError(_) => "serialization",
            Self::HttpError(e) if e.is_timeout() => "timeout",
            Self::HttpError(_) => "http",
            Self::UnexpectedResponse(_) => "unexpected_response",
        }
    }
}
