//! Error types for the hedge-fund relay

use agent_llm::LLMError;
use thiserror::Error;

/// Client-facing message when a chat request carries no messages
pub const NO_MESSAGES: &str = "No messages provided";
/// Client-facing message when an analysis request carries no image
pub const IMAGE_REQUIRED: &str = "Image is required";
/// Client-facing message when a generation prompt is empty
pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Errors produced by a single relay call
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required field was missing or empty; no remote call was made
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The remote API call failed
    #[error(transparent)]
    Remote(#[from] LLMError),

    /// A local chart image could not be read
    #[error("Failed to read image '{path}': {source}")]
    ImageRead {
        /// Path that was requested
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl RelayError {
    /// Whether the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Errors outside a single relay call: configuration, startup, I/O
#[derive(Debug, Error)]
pub enum HedgeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Relay error
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// LLM client error
    #[error("LLM client error: {0}")]
    Llm(#[from] LLMError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Agent error
    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::Error),
}

/// Result type alias for hedge operations
pub type Result<T> = std::result::Result<T, HedgeError>;

/// Convert RelayError to agent_core::Error
impl From<RelayError> for agent_core::Error {
    fn from(err: RelayError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}
