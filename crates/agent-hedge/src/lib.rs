//! Hedge-fund LLM relay
//!
//! A thin layer that forwards chat messages, chart images and image prompts
//! to xAI's OpenAI-compatible API and hands the answers back. It includes:
//!
//! - [`Relay`]: the three single-call relays (chat, chart analysis, image
//!   generation) over an injected LLM client
//! - [`ImageAnalysisAgent`] and [`VisualGenerationAgent`]: per-ticker batch
//!   wrappers that write into a shared [`agent_core::AgentState`]
//! - [`server`]: the `POST /chat`, `/analyze_image` and `/generate_image`
//!   endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_core::{Agent, AgentState, TracingProgress};
//! use agent_hedge::{HedgeConfig, ImageAnalysisAgent, Relay};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HedgeConfig::from_env()?;
//!     let relay = Arc::new(Relay::from_config(&config)?);
//!
//!     let agent = ImageAnalysisAgent::new(relay, Arc::new(TracingProgress));
//!     let mut state = AgentState::new()
//!         .with_tickers(["AAPL"])
//!         .with_image("AAPL", "charts/aapl.png");
//!
//!     agent.run(&mut state).await?;
//!     println!("{:?}", state.analyst_signals(ImageAnalysisAgent::NAME));
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod config;
pub mod error;
pub mod prompts;
pub mod relay;
pub mod server;
pub mod signal;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use agents::{ImageAnalysisAgent, VisualGenerationAgent};
pub use config::HedgeConfig;
pub use error::{HedgeError, RelayError, Result};
pub use relay::{AnalysisRequest, Relay, RelayModels};
pub use signal::{Signal, SignalRecord};
