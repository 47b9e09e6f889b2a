//! LLM provider abstraction layer for agent-rs
//!
//! This crate provides provider-agnostic abstractions for interacting with
//! Large Language Models (LLMs). It includes:
//!
//! - Message types for LLM communication (text and image parts)
//! - Completion request/response types
//! - Image generation request/response types
//! - Provider traits for chat completion and image generation
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod error;
pub mod image;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use image::{
    GeneratedImage, ImageGenerationRequest, ImageGenerationResponse, ImageResponseFormat,
};
pub use messages::{ContentBlock, ImageDetail, ImageUrl, Message, MessageContent, Role};
pub use provider::{ImageGenerator, LLMProvider};

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
