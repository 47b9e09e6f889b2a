//! Single-call relays to the remote LLM API
//!
//! Each relay validates its input, makes exactly one remote call and hands
//! back the remote output with minimal shaping. Validation failures never
//! reach the network. Nothing is cached or retried: calling a relay twice
//! issues two remote calls.

use crate::config::HedgeConfig;
use crate::error::{HedgeError, IMAGE_REQUIRED, NO_MESSAGES, PROMPT_REQUIRED, RelayError};
use crate::prompts::{DEFAULT_ANALYSIS_PROMPT, DEFAULT_GENERATION_PROMPT};
use agent_llm::providers::OpenAIProvider;
use agent_llm::{
    CompletionRequest, ImageDetail, ImageGenerationRequest, ImageGenerator, ImageUrl,
    LLMProvider, Message,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Models used by each relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayModels {
    /// Chat completion model
    pub chat: String,
    /// Vision model
    pub vision: String,
    /// Image generation model
    pub image: String,
}

impl From<&HedgeConfig> for RelayModels {
    fn from(config: &HedgeConfig) -> Self {
        Self {
            chat: config.chat_model.clone(),
            vision: config.vision_model.clone(),
            image: config.image_model.clone(),
        }
    }
}

/// A chart to analyze and how to ask about it
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Base64 payload, or a `data:` / `http(s)://` URL
    pub image: String,
    /// Media type used when wrapping a bare base64 payload
    pub media_type: String,
    /// Prompt sent after the image; the generic default when unset
    pub prompt: Option<String>,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
}

impl AnalysisRequest {
    /// Analyze a base64 payload or image URL
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            media_type: DEFAULT_MEDIA_TYPE.to_string(),
            prompt: None,
            temperature: None,
        }
    }

    /// Resolve an image reference from pipeline state
    ///
    /// URLs pass through untouched. Anything else is treated as a local file,
    /// read and base64-encoded, with the media type taken from its extension.
    pub async fn from_reference(reference: &str) -> Result<Self, RelayError> {
        if is_image_url(reference) {
            return Ok(Self::new(reference));
        }

        let bytes = tokio::fs::read(reference)
            .await
            .map_err(|source| RelayError::ImageRead {
                path: reference.to_string(),
                source,
            })?;
        debug!(path = reference, bytes = bytes.len(), "Loaded chart image");

        Ok(Self::new(STANDARD.encode(bytes)).with_media_type(media_type_for(Path::new(reference))))
    }

    /// Set the prompt
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the media type of a bare base64 payload
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The image part sent to the vision model
    fn image_url(&self) -> ImageUrl {
        let url = if is_image_url(&self.image) {
            ImageUrl::new(self.image.clone())
        } else {
            ImageUrl::base64(&self.media_type, &self.image)
        };
        url.with_detail(ImageDetail::High)
    }
}

/// Stateless relay over an injected LLM client
///
/// # Example
///
/// ```no_run
/// use agent_hedge::{HedgeConfig, Relay};
/// use agent_llm::Message;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HedgeConfig::from_env()?;
/// let relay = Relay::from_config(&config)?;
///
/// let reply = relay.chat(vec![Message::user("Summarize today's tape")]).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct Relay {
    llm: Arc<dyn LLMProvider>,
    images: Arc<dyn ImageGenerator>,
    models: RelayModels,
    max_tokens: Option<usize>,
}

impl Relay {
    /// Create a relay over explicit clients
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        images: Arc<dyn ImageGenerator>,
        models: RelayModels,
    ) -> Self {
        Self {
            llm,
            images,
            models,
            max_tokens: None,
        }
    }

    /// Create a relay talking to the configured OpenAI-compatible API
    pub fn from_config(config: &HedgeConfig) -> Result<Self, HedgeError> {
        let provider = Arc::new(OpenAIProvider::with_config(config.provider_config())?);
        let mut relay = Self::new(provider.clone(), provider, RelayModels::from(config));
        relay.max_tokens = config.max_tokens;
        Ok(relay)
    }

    /// Cap generated tokens on chat and analysis calls
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Models in use
    pub fn models(&self) -> &RelayModels {
        &self.models
    }

    /// Forward a conversation and return the assistant's reply
    #[instrument(skip(self, messages), fields(model = %self.models.chat, messages = messages.len()))]
    pub async fn chat(&self, messages: Vec<Message>) -> Result<String, RelayError> {
        if messages.is_empty() {
            return Err(RelayError::InvalidInput(NO_MESSAGES));
        }

        let request = CompletionRequest::builder(self.models.chat.clone())
            .messages(messages)
            .max_tokens_opt(self.max_tokens)
            .build();

        let response = self.llm.complete(request).await.map_err(|e| {
            warn!(error = %e, kind = e.kind(), "Chat relay failed");
            RelayError::Remote(e)
        })?;

        Ok(response.text().to_string())
    }

    /// Send a chart to the vision model and return its text
    #[instrument(skip(self, request), fields(model = %self.models.vision))]
    pub async fn analyze_image(&self, request: AnalysisRequest) -> Result<String, RelayError> {
        if request.image.is_empty() {
            return Err(RelayError::InvalidInput(IMAGE_REQUIRED));
        }

        let prompt = request
            .prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_ANALYSIS_PROMPT.to_string());
        let mut builder = CompletionRequest::builder(self.models.vision.clone())
            .add_message(Message::user_with_image(request.image_url(), prompt))
            .max_tokens_opt(self.max_tokens);
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }

        let response = self.llm.complete(builder.build()).await.map_err(|e| {
            warn!(error = %e, kind = e.kind(), "Image analysis relay failed");
            RelayError::Remote(e)
        })?;

        Ok(response.text().to_string())
    }

    /// Generate one image and return its URL
    ///
    /// `None` uses the generic default prompt; an empty prompt is rejected.
    #[instrument(skip(self, prompt), fields(model = %self.models.image))]
    pub async fn generate_image(&self, prompt: Option<&str>) -> Result<String, RelayError> {
        let prompt = prompt.unwrap_or(DEFAULT_GENERATION_PROMPT);
        if prompt.is_empty() {
            return Err(RelayError::InvalidInput(PROMPT_REQUIRED));
        }

        let request = ImageGenerationRequest::new(self.models.image.clone(), prompt);
        let response = self.images.generate_image(request).await.map_err(|e| {
            warn!(error = %e, kind = e.kind(), "Image generation relay failed");
            RelayError::Remote(e)
        })?;

        response.first_url().map(str::to_string).ok_or_else(|| {
            RelayError::Remote(agent_llm::LLMError::UnexpectedResponse(
                "No image URL in response".to_string(),
            ))
        })
    }
}

/// Whether an image reference is already a URL the API accepts
fn is_image_url(reference: &str) -> bool {
    reference.starts_with("data:")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
}

/// Media type for a chart file, by extension
fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockImages, MockLlm, completion, image_response, relay_with};
    use agent_llm::{ContentBlock, LLMError, MessageContent};
    use std::io::Write;

    fn image_part(request: &CompletionRequest) -> (String, Option<ImageDetail>, String) {
        let Some(MessageContent::Blocks(blocks)) = &request.messages[0].content else {
            panic!("Expected multi-part content");
        };
        let (ContentBlock::ImageUrl { image_url }, ContentBlock::Text { text }) =
            (&blocks[0], &blocks[1])
        else {
            panic!("Expected image then text, got {blocks:?}");
        };
        (image_url.url.clone(), image_url.detail, text.clone())
    }

    #[tokio::test]
    async fn test_chat_returns_first_completion_text() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .withf(|req| req.model == "grok-2-latest" && req.messages.len() == 2)
            .times(1)
            .returning(|_| Ok(completion("Stay long energy.")));

        let relay = relay_with(llm, MockImages::new());
        let reply = relay
            .chat(vec![Message::system("You run a fund."), Message::user("Views?")])
            .await
            .unwrap();
        assert_eq!(reply, "Stay long energy.");
    }

    #[tokio::test]
    async fn test_chat_without_messages_makes_no_call() {
        let mut llm = MockLlm::new();
        llm.expect_complete().never();

        let relay = relay_with(llm, MockImages::new());
        let err = relay.chat(Vec::new()).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(NO_MESSAGES)));
    }

    #[tokio::test]
    async fn test_chat_surfaces_remote_error_text() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .returning(|_| Err(LLMError::RateLimitExceeded("quota exhausted".to_string())));

        let relay = relay_with(llm, MockImages::new());
        let err = relay.chat(vec![Message::user("hi")]).await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded: quota exhausted");
    }

    #[tokio::test]
    async fn test_repeated_chat_calls_are_not_cached() {
        let mut llm = MockLlm::new();
        let mut replies = vec!["second", "first"];
        llm.expect_complete()
            .times(2)
            .returning(move |_| Ok(completion(replies.pop().unwrap_or_default())));

        let relay = relay_with(llm, MockImages::new());
        let first = relay.chat(vec![Message::user("same")]).await.unwrap();
        let second = relay.chat(vec![Message::user("same")]).await.unwrap();
        assert_eq!(first, "first");
        assert_eq!(second, "second");
    }

    #[tokio::test]
    async fn test_analyze_wraps_base64_as_jpeg_data_url() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .withf(|req| {
                let (url, detail, text) = image_part(req);
                req.model == "grok-2-vision-latest"
                    && url == "data:image/jpeg;base64,aGVsbG8="
                    && detail == Some(ImageDetail::High)
                    && text == DEFAULT_ANALYSIS_PROMPT
                    && req.temperature.is_none()
            })
            .times(1)
            .returning(|_| Ok(completion("Head and shoulders forming.")));

        let relay = relay_with(llm, MockImages::new());
        let reply = relay
            .analyze_image(AnalysisRequest::new("aGVsbG8="))
            .await
            .unwrap();
        assert_eq!(reply, "Head and shoulders forming.");
    }

    #[tokio::test]
    async fn test_analyze_passes_urls_and_prompt_through() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .withf(|req| {
                let (url, _, text) = image_part(req);
                url == "https://charts.example/aapl.png"
                    && text == "Where is support?"
                    && req.temperature == Some(0.01)
            })
            .times(1)
            .returning(|_| Ok(completion("Around 180.")));

        let relay = relay_with(llm, MockImages::new());
        let request = AnalysisRequest::new("https://charts.example/aapl.png")
            .with_prompt("Where is support?")
            .with_temperature(0.01);
        assert_eq!(relay.analyze_image(request).await.unwrap(), "Around 180.");
    }

    #[tokio::test]
    async fn test_analyze_without_image_makes_no_call() {
        let mut llm = MockLlm::new();
        llm.expect_complete().never();

        let relay = relay_with(llm, MockImages::new());
        let err = relay.analyze_image(AnalysisRequest::new("")).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(IMAGE_REQUIRED)));
    }

    #[tokio::test]
    async fn test_generate_returns_url() {
        let mut images = MockImages::new();
        images
            .expect_generate_image()
            .withf(|req| {
                req.model == "grok-2-image" && req.n == 1 && req.prompt == "A bull in neon"
            })
            .times(1)
            .returning(|_| Ok(image_response("https://imgen.x.ai/bull.jpg")));

        let relay = relay_with(MockLlm::new(), images);
        let url = relay.generate_image(Some("A bull in neon")).await.unwrap();
        assert_eq!(url, "https://imgen.x.ai/bull.jpg");
    }

    #[tokio::test]
    async fn test_generate_defaults_prompt_when_omitted() {
        let mut images = MockImages::new();
        images
            .expect_generate_image()
            .withf(|req| req.prompt == DEFAULT_GENERATION_PROMPT)
            .times(1)
            .returning(|_| Ok(image_response("https://imgen.x.ai/default.jpg")));

        let relay = relay_with(MockLlm::new(), images);
        assert!(relay.generate_image(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_empty_prompt_makes_no_call() {
        let mut images = MockImages::new();
        images.expect_generate_image().never();

        let relay = relay_with(MockLlm::new(), images);
        let err = relay.generate_image(Some("")).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidInput(PROMPT_REQUIRED)));
    }

    #[tokio::test]
    async fn test_generate_without_url_is_remote_error() {
        let mut images = MockImages::new();
        images
            .expect_generate_image()
            .returning(|_| Ok(agent_llm::ImageGenerationResponse::default()));

        let relay = relay_with(MockLlm::new(), images);
        let err = relay.generate_image(Some("x")).await.unwrap_err();
        assert!(matches!(err, RelayError::Remote(LLMError::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_reference_from_file() {
        let mut file = tempfile::Builder::new().suffix(".PNG").tempfile().unwrap();
        file.write_all(b"hello").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let request = AnalysisRequest::from_reference(&path).await.unwrap();
        assert_eq!(request.image, "aGVsbG8=");
        assert_eq!(request.media_type, "image/png");
        assert_eq!(request.image_url().url, "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_reference_url_passes_through() {
        let request = AnalysisRequest::from_reference("data:image/gif;base64,R0lG")
            .await
            .unwrap();
        assert_eq!(request.image_url().url, "data:image/gif;base64,R0lG");
    }

    #[tokio::test]
    async fn test_reference_missing_file() {
        let err = AnalysisRequest::from_reference("/definitely/not/here.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::ImageRead { ref path, .. } if path == "/definitely/not/here.jpg"));
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for(Path::new("a.png")), "image/png");
        assert_eq!(media_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(media_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("chart")), "image/jpeg");
    }
}
