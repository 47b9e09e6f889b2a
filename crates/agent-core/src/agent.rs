//! Core Agent trait definition

use crate::{AgentState, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message emitted by an agent for downstream pipeline stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Name of the agent that produced the message
    pub name: String,
    /// Message body (usually JSON)
    pub content: String,
}

impl AgentMessage {
    /// Create a new agent message
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// What an agent hands back to the pipeline besides its state writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Messages to append to the pipeline conversation
    pub messages: Vec<AgentMessage>,
}

impl AgentOutput {
    /// Output carrying no messages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Output carrying a single message
    pub fn with_message(message: AgentMessage) -> Self {
        Self {
            messages: vec![message],
        }
    }
}

/// Core trait that all pipeline agents implement
///
/// An agent reads what it needs from the shared [`AgentState`], does its
/// remote work and writes its results back under its own key. The state is
/// borrowed mutably, so only one agent can touch it at a time.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Run the agent against the pipeline state
    async fn run(&self, state: &mut AgentState) -> Result<AgentOutput>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
