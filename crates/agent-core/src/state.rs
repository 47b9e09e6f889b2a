//! Shared pipeline state
//!
//! The [`AgentState`] is the mutable mapping that pipeline stages pass from
//! one agent to the next. It is owned by the caller; agents only read the
//! keys they need and write their own named sub-key. Everything lives under
//! the top-level `data` object:
//!
//! ```text
//! data.tickers                                   [ticker, ...]
//! data.images                                    {ticker: image reference}
//! data.analyst_signals.<agent>                   {ticker: record}
//! data.analyst_signals.portfolio_management_agent.<ticker>.action
//! data.visuals                                   {ticker: url}
//! ```
//!
//! Keys this crate does not know about are carried through untouched.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known state keys
pub mod keys {
    /// Ordered list of ticker identifiers
    pub const TICKERS: &str = "tickers";
    /// Ticker → chart image reference
    pub const IMAGES: &str = "images";
    /// Agent name → ticker → signal
    pub const ANALYST_SIGNALS: &str = "analyst_signals";
    /// Ticker → generated visual URL
    pub const VISUALS: &str = "visuals";
    /// Agent whose `action` per ticker drives visual generation
    pub const PORTFOLIO_MANAGER: &str = "portfolio_management_agent";
    /// Field holding the portfolio manager's decision
    pub const ACTION: &str = "action";
}

/// Pipeline state passed between agents
///
/// # Example
///
/// ```
/// use agent_core::AgentState;
///
/// let state = AgentState::new()
///     .with_tickers(["AAPL", "MSFT"])
///     .with_image("AAPL", "charts/aapl.png");
///
/// assert_eq!(state.tickers().unwrap(), vec!["AAPL", "MSFT"]);
/// assert_eq!(state.image_for("AAPL"), Some("charts/aapl.png"));
/// assert_eq!(state.image_for("MSFT"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Per-run pipeline data
    #[serde(default)]
    data: Map<String, Value>,

    /// Top-level keys owned by other pipeline stages
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl AgentState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from an arbitrary JSON document
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::InvalidState {
            key: "data".to_string(),
            reason: e.to_string(),
        })
    }

    /// Convert the state back into a JSON document
    pub fn into_value(self) -> Value {
        let mut root = self.extra;
        root.insert("data".to_string(), Value::Object(self.data));
        Value::Object(root)
    }

    // =========== Builder Methods ===========

    /// Set the tickers to process
    pub fn with_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tickers: Vec<Value> = tickers.into_iter().map(|t| Value::String(t.into())).collect();
        self.data.insert(keys::TICKERS.to_string(), Value::Array(tickers));
        self
    }

    /// Attach a chart image reference to a ticker
    pub fn with_image(mut self, ticker: impl Into<String>, reference: impl Into<String>) -> Self {
        self.object_mut(keys::IMAGES)
            .insert(ticker.into(), Value::String(reference.into()));
        self
    }

    /// Record the portfolio manager's action for a ticker
    pub fn with_portfolio_action(
        mut self,
        ticker: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        let signals = self.object_mut(keys::ANALYST_SIGNALS);
        let manager = ensure_object(signals, keys::PORTFOLIO_MANAGER);
        manager.insert(
            ticker.into(),
            serde_json::json!({ keys::ACTION: action.into() }),
        );
        self
    }

    // =========== Typed Accessors ===========

    /// Tickers to process, in order
    pub fn tickers(&self) -> Result<Vec<String>> {
        let value = self
            .data
            .get(keys::TICKERS)
            .ok_or_else(|| Error::MissingStateKey(format!("data.{}", keys::TICKERS)))?;

        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidState {
            key: format!("data.{}", keys::TICKERS),
            reason: e.to_string(),
        })
    }

    /// Image reference for a ticker, if one is on file
    ///
    /// Empty strings count as "no image".
    pub fn image_for(&self, ticker: &str) -> Option<&str> {
        self.data
            .get(keys::IMAGES)
            .and_then(|images| images.get(ticker))
            .and_then(Value::as_str)
            .filter(|reference| !reference.is_empty())
    }

    /// The portfolio manager's action for a ticker, if any
    pub fn portfolio_action(&self, ticker: &str) -> Option<&str> {
        self.analyst_signals(keys::PORTFOLIO_MANAGER)
            .and_then(|signals| signals.get(ticker))
            .and_then(|entry| entry.get(keys::ACTION))
            .and_then(Value::as_str)
    }

    /// Signals written by a given agent
    pub fn analyst_signals(&self, agent: &str) -> Option<&Value> {
        self.data
            .get(keys::ANALYST_SIGNALS)
            .and_then(|signals| signals.get(agent))
    }

    /// Replace the signals written by a given agent
    pub fn set_analyst_signals(&mut self, agent: impl Into<String>, signals: Value) {
        self.object_mut(keys::ANALYST_SIGNALS)
            .insert(agent.into(), signals);
    }

    /// Generated visuals, keyed by ticker
    pub fn visuals(&self) -> Option<&Map<String, Value>> {
        self.data.get(keys::VISUALS).and_then(Value::as_object)
    }

    /// Replace the generated visuals
    pub fn set_visuals(&mut self, visuals: Map<String, Value>) {
        self.data
            .insert(keys::VISUALS.to_string(), Value::Object(visuals));
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value under `data`
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from under `data`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Get (creating if needed) an object under `data`
    fn object_mut(&mut self, key: &str) -> &mut Map<String, Value> {
        ensure_object(&mut self.data, key)
    }
}

/// Get the object at `key`, replacing any non-object value with `{}`
fn ensure_object<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(object) => object,
        _ => unreachable!("slot was just made an object"),
    }
}
