//! Core abstractions for agent-rs
//!
//! This crate defines the fundamental traits and types shared by the
//! pipeline agents: the [`Agent`] trait, the caller-owned [`AgentState`],
//! progress reporting and the common error type.

pub mod agent;
pub mod error;
pub mod progress;
pub mod state;

pub use agent::{Agent, AgentMessage, AgentOutput};
pub use error::{Error, Result};
pub use progress::{ProgressEvent, ProgressLog, ProgressReporter, TracingProgress};
pub use state::AgentState;
