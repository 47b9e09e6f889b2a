//! Mock LLM clients shared by the unit tests

use crate::relay::{Relay, RelayModels};
use agent_llm::{
    CompletionRequest, CompletionResponse, GeneratedImage, ImageGenerationRequest,
    ImageGenerationResponse, ImageGenerator, LLMProvider, Message, StopReason, TokenUsage,
};
use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Llm {}

    #[async_trait]
    impl LLMProvider for Llm {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

mock! {
    pub Images {}

    #[async_trait]
    impl ImageGenerator for Images {
        async fn generate_image(
            &self,
            request: ImageGenerationRequest,
        ) -> agent_llm::Result<ImageGenerationResponse>;
    }
}

/// A completion whose assistant text is `text`
pub fn completion(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// An image generation response with a single URL
pub fn image_response(url: &str) -> ImageGenerationResponse {
    ImageGenerationResponse {
        images: vec![GeneratedImage {
            url: Some(url.to_string()),
            ..GeneratedImage::default()
        }],
    }
}

/// Relay over mocks, using the default model names
pub fn relay_with(llm: MockLlm, images: MockImages) -> Relay {
    Relay::new(
        Arc::new(llm),
        Arc::new(images),
        RelayModels {
            chat: crate::config::DEFAULT_CHAT_MODEL.to_string(),
            vision: crate::config::DEFAULT_VISION_MODEL.to_string(),
            image: crate::config::DEFAULT_IMAGE_MODEL.to_string(),
        },
    )
}
