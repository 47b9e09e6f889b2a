//! Configuration for the hedge-fund relay

use crate::error::{HedgeError, Result};
use agent_llm::providers::OpenAIConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// xAI's OpenAI-compatible endpoint
pub const DEFAULT_API_BASE: &str = "https://api.x.ai/v1";
/// Model used for plain chat
pub const DEFAULT_CHAT_MODEL: &str = "grok-2-latest";
/// Model used for chart analysis
pub const DEFAULT_VISION_MODEL: &str = "grok-2-vision-latest";
/// Model used for image generation
pub const DEFAULT_IMAGE_MODEL: &str = "grok-2-image";

/// Configuration for the relay, the agents and the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeConfig {
    /// API key for the remote LLM provider
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// Base URL of the remote API
    pub api_base: String,

    /// Chat completion model
    pub chat_model: String,

    /// Vision model for chart analysis
    pub vision_model: String,

    /// Image generation model
    pub image_model: String,

    /// Sampling temperature used by the chart-analysis agent
    pub analysis_temperature: f32,

    /// Optional cap on generated tokens (provider default when unset)
    pub max_tokens: Option<usize>,

    /// Timeout for each remote call
    pub request_timeout: Duration,

    /// Address the HTTP server listens on
    pub bind_addr: String,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            analysis_temperature: 0.01,
            max_tokens: None,
            request_timeout: Duration::from_secs(120),
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

impl HedgeConfig {
    /// Create a new configuration builder
    pub fn builder() -> HedgeConfigBuilder {
        HedgeConfigBuilder::default()
    }

    /// Load configuration from the environment
    ///
    /// `XAI_API_KEY` is required. Optional overrides: `XAI_API_BASE`,
    /// `HEDGE_CHAT_MODEL`, `HEDGE_VISION_MODEL`, `HEDGE_IMAGE_MODEL`,
    /// `HEDGE_MAX_TOKENS`, `HEDGE_REQUEST_TIMEOUT_SECS`, `HEDGE_BIND_ADDR`.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(HedgeError::ConfigError(
                "XAI_API_KEY not found in environment variables".to_string(),
            ));
        }

        for (name, model) in [
            ("chat_model", &self.chat_model),
            ("vision_model", &self.vision_model),
            ("image_model", &self.image_model),
        ] {
            if model.trim().is_empty() {
                return Err(HedgeError::ConfigError(format!("{name} must not be empty")));
            }
        }

        if !(0.0..=2.0).contains(&self.analysis_temperature) {
            return Err(HedgeError::ConfigError(format!(
                "analysis_temperature must be within 0.0..=2.0, got {}",
                self.analysis_temperature
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(HedgeError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        self.socket_addr()?;
        Ok(())
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|e| {
            HedgeError::ConfigError(format!("Invalid bind address '{}': {e}", self.bind_addr))
        })
    }

    /// Client configuration for the OpenAI-compatible provider
    pub fn provider_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.api_key.clone())
            .with_api_base(self.api_base.clone())
            .with_timeout(self.request_timeout)
            .with_provider_name("xai")
    }
}

/// Builder for HedgeConfig
#[derive(Debug, Default)]
pub struct HedgeConfigBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    chat_model: Option<String>,
    vision_model: Option<String>,
    image_model: Option<String>,
    analysis_temperature: Option<f32>,
    max_tokens: Option<usize>,
    request_timeout: Option<Duration>,
    bind_addr: Option<String>,
    invalid_env: Option<String>,
}

impl HedgeConfigBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the chat model
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Set the vision model
    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.vision_model = Some(model.into());
        self
    }

    /// Set the image generation model
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = Some(model.into());
        self
    }

    /// Set the chart-analysis temperature
    pub fn analysis_temperature(mut self, temperature: f32) -> Self {
        self.analysis_temperature = Some(temperature);
        self
    }

    /// Cap generated tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the server listen address
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Fill unset fields from environment variables
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    /// Fill unset fields from a variable lookup
    ///
    /// Blank values count as unset. A numeric variable that does not parse
    /// makes [`build`](Self::build) fail.
    pub fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        self.api_key = self.api_key.or_else(|| var("XAI_API_KEY"));
        self.api_base = self.api_base.or_else(|| var("XAI_API_BASE"));
        self.chat_model = self.chat_model.or_else(|| var("HEDGE_CHAT_MODEL"));
        self.vision_model = self.vision_model.or_else(|| var("HEDGE_VISION_MODEL"));
        self.image_model = self.image_model.or_else(|| var("HEDGE_IMAGE_MODEL"));
        self.bind_addr = self.bind_addr.or_else(|| var("HEDGE_BIND_ADDR"));

        if self.max_tokens.is_none() {
            if let Some(raw) = var("HEDGE_MAX_TOKENS") {
                match raw.trim().parse() {
                    Ok(max_tokens) => self.max_tokens = Some(max_tokens),
                    Err(e) => self.reject_env("HEDGE_MAX_TOKENS", &raw, &e),
                }
            }
        }

        if self.request_timeout.is_none() {
            if let Some(raw) = var("HEDGE_REQUEST_TIMEOUT_SECS") {
                match raw.trim().parse() {
                    Ok(secs) => self.request_timeout = Some(Duration::from_secs(secs)),
                    Err(e) => self.reject_env("HEDGE_REQUEST_TIMEOUT_SECS", &raw, &e),
                }
            }
        }

        self
    }

    fn reject_env(&mut self, name: &str, raw: &str, err: &dyn std::fmt::Display) {
        self.invalid_env
            .get_or_insert_with(|| format!("Invalid {name} '{raw}': {err}"));
    }

    /// Build the configuration
    pub fn build(self) -> Result<HedgeConfig> {
        if let Some(message) = self.invalid_env {
            return Err(HedgeError::ConfigError(message));
        }

        let defaults = HedgeConfig::default();

        let config = HedgeConfig {
            api_key: self.api_key.unwrap_or(defaults.api_key),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            chat_model: self.chat_model.unwrap_or(defaults.chat_model),
            vision_model: self.vision_model.unwrap_or(defaults.vision_model),
            image_model: self.image_model.unwrap_or(defaults.image_model),
            analysis_temperature: self
                .analysis_temperature
                .unwrap_or(defaults.analysis_temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_models() {
        let config = HedgeConfig::default();
        assert_eq!(config.chat_model, "grok-2-latest");
        assert_eq!(config.vision_model, "grok-2-vision-latest");
        assert_eq!(config.image_model, "grok-2-image");
        assert_eq!(config.api_base, "https://api.x.ai/v1");
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = HedgeConfig::builder().build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: XAI_API_KEY not found in environment variables"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = HedgeConfig::builder()
            .api_key("xai-test")
            .chat_model("grok-beta")
            .max_tokens(512)
            .request_timeout(Duration::from_secs(30))
            .bind_addr("0.0.0.0:8080")
            .build()
            .unwrap();

        assert_eq!(config.chat_model, "grok-beta");
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let result = HedgeConfig::builder()
            .api_key("xai-test")
            .bind_addr("not-an-address")
            .build();
        assert!(matches!(result, Err(HedgeError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_temperature() {
        let result = HedgeConfig::builder()
            .api_key("xai-test")
            .analysis_temperature(3.5)
            .build();
        assert!(matches!(result, Err(HedgeError::ConfigError(_))));
    }

    #[test]
    fn test_provider_config() {
        let config = HedgeConfig::builder()
            .api_key("xai-test")
            .request_timeout(Duration::from_secs(45))
            .build()
            .unwrap();

        let provider = config.provider_config();
        assert_eq!(provider.api_key, "xai-test");
        assert_eq!(provider.api_base, "https://api.x.ai/v1");
        assert_eq!(provider.timeout, Duration::from_secs(45));
        assert_eq!(provider.provider_name, "xai");
    }

    #[test]
    fn test_sub_second_timeout_reaches_provider() {
        let config = HedgeConfig::builder()
            .api_key("xai-test")
            .request_timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.provider_config().timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = HedgeConfig::builder()
            .api_key("xai-test")
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(HedgeError::ConfigError(_))));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_vars_fill_unset_fields() {
        let config = HedgeConfig::builder()
            .chat_model("grok-beta")
            .with_vars(vars(&[
                ("XAI_API_KEY", "xai-env"),
                ("HEDGE_CHAT_MODEL", "ignored"),
                ("HEDGE_VISION_MODEL", "  "),
                ("HEDGE_MAX_TOKENS", "1024"),
                ("HEDGE_REQUEST_TIMEOUT_SECS", "30"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.api_key, "xai-env");
        assert_eq!(config.chat_model, "grok-beta");
        assert_eq!(config.vision_model, DEFAULT_VISION_MODEL);
        assert_eq!(config.max_tokens, Some(1024));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unparseable_max_tokens_rejected() {
        let err = HedgeConfig::builder()
            .with_vars(vars(&[("XAI_API_KEY", "xai-env"), ("HEDGE_MAX_TOKENS", "lots")]))
            .build()
            .unwrap_err();

        assert!(matches!(err, HedgeError::ConfigError(_)));
        assert!(err.to_string().contains("HEDGE_MAX_TOKENS 'lots'"));
    }

    #[test]
    fn test_unparseable_timeout_rejected() {
        let err = HedgeConfig::builder()
            .with_vars(vars(&[
                ("XAI_API_KEY", "xai-env"),
                ("HEDGE_REQUEST_TIMEOUT_SECS", "1.5"),
            ]))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("HEDGE_REQUEST_TIMEOUT_SECS '1.5'"));
    }

    #[test]
    fn test_explicit_value_skips_env_parse() {
        let config = HedgeConfig::builder()
            .max_tokens(256)
            .with_vars(vars(&[("XAI_API_KEY", "xai-env"), ("HEDGE_MAX_TOKENS", "lots")]))
            .build()
            .unwrap();
        assert_eq!(config.max_tokens, Some(256));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = HedgeConfig::builder().api_key("secret").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
