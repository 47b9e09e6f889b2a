//! Progress reporting for per-ticker agent work
//!
//! Agents announce what they are doing for each ticker through a
//! [`ProgressReporter`]. The reporter is a sink: agents never read back
//! from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

/// Sink for agent status updates
pub trait ProgressReporter: Send + Sync {
    /// Record that `agent` is at `status` for `ticker`
    fn update_status(&self, agent: &str, ticker: &str, status: &str);
}

/// Reporter that emits each update as a tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn update_status(&self, agent: &str, ticker: &str, status: &str) {
        info!(agent, ticker, status, "progress");
    }
}

/// A single recorded status update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Agent that reported
    pub agent: String,
    /// Ticker the update refers to
    pub ticker: String,
    /// Free-form status text
    pub status: String,
    /// When the update was recorded
    pub timestamp: DateTime<Utc>,
}

/// Reporter that keeps every update in memory
///
/// Useful for rendering a run summary afterwards.
#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Latest status per (agent, ticker), in first-seen order
    pub fn latest(&self) -> Vec<ProgressEvent> {
        let mut latest: Vec<ProgressEvent> = Vec::new();
        for event in self.events() {
            match latest
                .iter_mut()
                .find(|e| e.agent == event.agent && e.ticker == event.ticker)
            {
                Some(existing) => *existing = event,
                None => latest.push(event),
            }
        }
        latest
    }
}

impl ProgressReporter for ProgressLog {
    fn update_status(&self, agent: &str, ticker: &str, status: &str) {
        let event = ProgressEvent {
            agent: agent.to_string(),
            ticker: ticker.to_string(),
            status: status.to_string(),
            timestamp: Utc::now(),
        };
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        events.push(event);
    }
}
