//! Image generation request and response types

use serde::{Deserialize, Serialize};

/// How the provider should hand back generated images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    /// Hosted URL
    #[default]
    Url,
}

/// Request to generate images from a text prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// Text description of the desired image
    pub prompt: String,

    /// Number of images to generate
    pub n: u32,

    /// Output format
    pub response_format: ImageResponseFormat,
}

impl ImageGenerationRequest {
    /// Request a single image returned as a URL
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            response_format: ImageResponseFormat::Url,
        }
    }
}

/// One generated image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Hosted URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Prompt after provider-side rewriting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// Response from image generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationResponse {
    /// Generated images, in provider order
    pub images: Vec<GeneratedImage>,
}

impl ImageGenerationResponse {
    /// URL of the first generated image
    pub fn first_url(&self) -> Option<&str> {
        self.images.first().and_then(|image| image.url.as_deref())
    }
}
