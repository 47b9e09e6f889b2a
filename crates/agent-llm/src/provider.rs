//! LLM provider trait definitions

use async_trait::async_trait;
use crate::{
    CompletionRequest, CompletionResponse, ImageGenerationRequest, ImageGenerationResponse, Result,
};

/// Trait for chat-completion providers
///
/// Implementations of this trait provide access to different LLM services.
/// Vision requests are ordinary completions whose messages carry image parts.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "openai", "xai")
    fn name(&self) -> &str;
}

/// Trait for text-to-image providers
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate images from a text prompt
    async fn generate_image(&self, request: ImageGenerationRequest)
    -> Result<ImageGenerationResponse>;
}
