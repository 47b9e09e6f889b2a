//! OpenAI-compatible provider implementation
//!
//! This module implements [`LLMProvider`] and [`ImageGenerator`] against the
//! OpenAI REST shape (`/chat/completions`, `/images/generations`). xAI's Grok
//! API speaks the same protocol, so the provider is pointed at it by base URL.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ## Chat completion
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, Message, LLMProvider};
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpenAIConfig::new("xai-...").with_api_base("https://api.x.ai/v1");
//!     let provider = OpenAIProvider::with_config(config)?;
//!
//!     let request = CompletionRequest::builder("grok-2-latest")
//!         .add_message(Message::user("How did the S&P 500 close?"))
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Image generation
//!
//! ```no_run
//! use agent_llm::{ImageGenerationRequest, ImageGenerator};
//! use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = OpenAIProvider::with_config(
//!     OpenAIConfig::new("xai-...").with_api_base("https://api.x.ai/v1"),
//! )?;
//!
//! let response = provider
//!     .generate_image(ImageGenerationRequest::new("grok-2-image", "a bullish chart"))
//!     .await?;
//! println!("{:?}", response.first_url());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, GeneratedImage, ImageGenerationRequest,
    ImageGenerationResponse, ImageGenerator, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    /// Point it at any OpenAI-compatible service, e.g. "https://api.x.ai/v1".
    pub api_base: String,

    /// Per-request timeout (default: 120s)
    pub timeout: Duration,

    /// Name reported by [`LLMProvider::name`]
    pub provider_name: String,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the name the provider reports
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            provider_name: "openai".to_string(),
        }
    }
}

/// OpenAI-compatible provider
///
/// One reqwest client is shared by every call; nothing else is kept between
/// requests.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new provider with custom configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use agent_llm::providers::{OpenAIProvider, OpenAIConfig};
    /// use std::time::Duration;
    ///
    /// let config = OpenAIConfig::new("xai-...")
    ///     .with_api_base("https://api.x.ai/v1")
    ///     .with_timeout(Duration::from_secs(60))
    ///     .with_provider_name("xai");
    ///
    /// let provider = OpenAIProvider::with_config(config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// POST a JSON body to `{api_base}/{path}` and hand back the response
    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let response = self
            .client
            .post(format!("{}/{path}", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending chat completion to {}", self.config.api_base);

        let openai_request = OpenAIRequest {
            model: request.model.clone(),
            messages: build_openai_messages(request.system, request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop_sequences,
        };

        let response = self.post("chat/completions", &openai_request).await?;
        let response = check_status(response, &request.model).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        // OpenAI can return multiple choices; only the first is used
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        debug!(
            "Received response - stop_reason: {:?}, tokens: {}/{}",
            choice.finish_reason,
            openai_response.usage.prompt_tokens,
            openai_response.usage.completion_tokens
        );

        Ok(CompletionResponse {
            message: parse_openai_response(choice.message),
            stop_reason: map_stop_reason(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: openai_response.usage.prompt_tokens,
                output_tokens: openai_response.usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }
}

#[async_trait]
impl ImageGenerator for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        debug!("Sending image generation to {}", self.config.api_base);

        let response = self.post("images/generations", &request).await?;
        let response = check_status(response, &request.model).await?;

        let body: OpenAIImageResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse image response: {e}"))
        })?;

        let images = parse_image_response(body)?;
        debug!("Received {} generated image(s)", images.images.len());
        Ok(images)
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIImageResponse {
    #[serde(default)]
    data: Vec<OpenAIImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAIImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Map a non-success HTTP status to an [`LLMError`]
async fn check_status(response: Response, model: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await?;
    warn!(%status, "Remote API returned an error");
    Err(error_for_status(status, error_text, model))
}

fn error_for_status(status: StatusCode, error_text: String, model: &str) -> LLMError {
    match status.as_u16() {
        401 | 403 => LLMError::AuthenticationFailed,
        429 => LLMError::RateLimitExceeded(error_text),
        400 => LLMError::InvalidRequest(error_text),
        404 => LLMError::ModelNotFound(model.to_string()),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
    }
}

/// Build the messages array
///
/// The system prompt, if any, goes first as a system-role message.
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<Message> {
    let mut result = Vec::with_capacity(messages.len() + 1);
    if let Some(sys) = system {
        result.push(Message::system(sys));
    }
    result.extend(messages);
    result
}

/// Parse the response message into our format
fn parse_openai_response(msg: OpenAIResponseMessage) -> Message {
    Message {
        role: Role::Assistant,
        content: msg.content.map(MessageContent::Text),
        extra: serde_json::Map::new(),
    }
}

/// Parse an image generation response
///
/// A response whose first image carries no URL is treated as malformed.
fn parse_image_response(body: OpenAIImageResponse) -> Result<ImageGenerationResponse> {
    let images: Vec<GeneratedImage> = body
        .data
        .into_iter()
        .map(|d| GeneratedImage {
            url: d.url,
            revised_prompt: d.revised_prompt,
        })
        .collect();

    if images.first().and_then(|image| image.url.as_ref()).is_none() {
        return Err(LLMError::UnexpectedResponse(
            "No image URL in response".to_string(),
        ));
    }

    Ok(ImageGenerationResponse { images })
}

/// Map OpenAI stop reason to our format
fn map_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("stop") | None => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => {
            debug!("Content filtered by provider safety systems");
            StopReason::ContentFilter
        }
        Some(other) => {
            debug!("Unknown stop reason: {}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
