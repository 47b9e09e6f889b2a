//! Message types for LLM communication
//!
//! This module defines the conversation types exchanged with the LLM. The
//! JSON shape follows the OpenAI chat format, so conversations posted by
//! HTTP clients deserialize straight into [`Message`] and are forwarded to
//! any OpenAI-compatible API without re-shaping. Roles and message fields
//! this crate does not model are carried through verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message role in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// System message
    System,
    /// Any other role (`developer`, `tool`, ...)
    #[serde(untagged)]
    Other(String),
}

/// Resolution hint for vision models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    /// Let the model decide
    Auto,
    /// Low resolution, fewer tokens
    Low,
    /// High resolution
    High,
}

/// Reference to an image: a remote URL or a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Image URL
    pub url: String,

    /// Optional resolution hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

impl ImageUrl {
    /// Reference an image by URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detail: None,
        }
    }

    /// Inline base64 image data as a `data:` URL
    pub fn base64(media_type: &str, data: &str) -> Self {
        Self::new(format!("data:{media_type};base64,{data}"))
    }

    /// Set the resolution hint
    pub fn with_detail(mut self, detail: ImageDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Content block in a message (supports multi-modal content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text content
    Text {
        /// Text content
        text: String,
    },

    /// Image content
    ImageUrl {
        /// Image reference
        image_url: ImageUrl,
    },
}

/// Message content: either simple text or structured blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Remaining fields (`name`, `tool_call_id`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(MessageContent::Text(text.into())),
            extra: Map::new(),
        }
    }

    /// Create a user message carrying an image followed by a text prompt
    pub fn user_with_image(image: ImageUrl, text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::ImageUrl { image_url: image },
                ContentBlock::Text { text: text.into() },
            ])),
            extra: Map::new(),
        }
    }

    /// Extract text content from the message (convenience method)
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            Some(MessageContent::Blocks(blocks)) => blocks.iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ImageUrl { .. } => None,
            }),
            None => None,
        }
    }

    /// Whether this message carries any image parts
    pub fn has_images(&self) -> bool {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::ImageUrl { .. })),
            _ => false,
        }
    }
}
