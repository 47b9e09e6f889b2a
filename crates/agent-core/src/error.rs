//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A key the agent needs is missing from the pipeline state
    #[error("Missing state key: {0}")]
    MissingStateKey(String),

    /// A state value has the wrong shape
    #[error("Invalid state value at '{key}': {reason}")]
    InvalidState {
        /// Dotted path of the offending key
        key: String,
        /// What was wrong with it
        reason: String,
    },
}
