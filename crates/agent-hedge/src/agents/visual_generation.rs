//! Visual generation agent

use agent_core::{Agent, AgentOutput, AgentState, Error, ProgressReporter, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::prompts::{self, DEFAULT_ACTION};
use crate::relay::Relay;

/// Agent that renders one illustrative image per ticker
///
/// The prompt is built from the portfolio manager's action for the ticker
/// (`hold` when there is none). Results go to `data.visuals`; a failed
/// generation stores an inline error string instead of a URL so one bad
/// ticker does not sink the batch.
pub struct VisualGenerationAgent {
    relay: Arc<Relay>,
    progress: Arc<dyn ProgressReporter>,
}

impl VisualGenerationAgent {
    /// Name used for progress updates
    pub const NAME: &'static str = "visual_generation_agent";

    /// Create a new visual generation agent
    pub fn new(relay: Arc<Relay>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self { relay, progress }
    }
}

#[async_trait]
impl Agent for VisualGenerationAgent {
    async fn run(&self, state: &mut AgentState) -> Result<AgentOutput> {
        let tickers = state.tickers()?;
        let mut visuals = Map::new();

        for ticker in &tickers {
            self.progress
                .update_status(Self::NAME, ticker, "Generating visual");

            let action = state.portfolio_action(ticker).unwrap_or(DEFAULT_ACTION);
            let prompt = prompts::visual_prompt(action, ticker)
                .map_err(|e| Error::ProcessingFailed(format!("Failed to render prompt: {e}")))?;

            let entry = match self.relay.generate_image(Some(&prompt)).await {
                Ok(url) => url,
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Visual generation failed");
                    format!("Error generating visual: {e}")
                }
            };
            visuals.insert(ticker.clone(), Value::String(entry));

            self.progress.update_status(Self::NAME, ticker, "Done");
        }

        state.set_visuals(visuals);
        Ok(AgentOutput::empty())
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
