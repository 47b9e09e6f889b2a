//! Trading signals parsed from vision-model output
//!
//! The chart-analysis prompt asks the model for a signal, a confidence and
//! its reasoning. Models answer either with a JSON object or with prose, so
//! parsing is best-effort: a JSON object with the expected fields becomes a
//! [`SignalRecord`]; anything else becomes the neutral fallback record
//! carrying the raw text.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Confidence assigned when the model output could not be parsed
pub const FALLBACK_CONFIDENCE: f64 = 50.0;

/// Directional classification of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Expect the price to rise
    Bullish,
    /// Expect the price to fall
    Bearish,
    /// No directional view
    Neutral,
}

impl Signal {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = SignalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullish" => Ok(Self::Bullish),
            "bearish" => Ok(Self::Bearish),
            "neutral" => Ok(Self::Neutral),
            other => Err(SignalParseError::UnknownSignal(other.to_string())),
        }
    }
}

/// Per-ticker result of chart analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Directional call
    #[serde(rename = "signal")]
    pub classification: Signal,

    /// Confidence, 0 to 100; whole values are written as integers
    #[serde(serialize_with = "serialize_confidence")]
    pub confidence: f64,

    /// Model's explanation
    #[serde(rename = "reasoning")]
    pub rationale: String,
}

impl SignalRecord {
    /// The neutral record used when model output is not structured
    pub fn fallback(raw: impl Into<String>) -> Self {
        Self {
            classification: Signal::Neutral,
            confidence: FALLBACK_CONFIDENCE,
            rationale: raw.into(),
        }
    }

    /// Parse model output, falling back to [`SignalRecord::fallback`]
    ///
    /// A fallback is logged at `warn` so masked parse errors stay visible.
    pub fn from_model_output(raw: &str) -> Self {
        match parse_signal(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Model output is not a structured signal, using neutral fallback");
                Self::fallback(raw)
            }
        }
    }
}

/// Write `85.0` as `85` so model output round-trips unchanged
fn serialize_confidence<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && (0.0..=100.0).contains(value) {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Why model output could not be read as a signal
#[derive(Debug, Error)]
pub enum SignalParseError {
    /// Output is not a JSON object
    #[error("output is not a JSON object")]
    NotJson,

    /// Output looked like JSON but did not decode
    #[error("malformed signal JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The signal field held an unknown value
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    /// The confidence field was not a number
    #[error("invalid confidence '{0}'")]
    InvalidConfidence(String),
}

/// Wire shape the prompt asks for; looser than [`SignalRecord`]
#[derive(Debug, Deserialize)]
struct RawSignal {
    signal: String,
    confidence: RawConfidence,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConfidence {
    Number(f64),
    Text(String),
}

impl RawConfidence {
    fn value(&self) -> Result<f64, SignalParseError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse()
                .map_err(|_| SignalParseError::InvalidConfidence(s.clone()))?,
        };
        if value.is_finite() {
            Ok(value.clamp(0.0, 100.0))
        } else {
            Err(SignalParseError::InvalidConfidence(value.to_string()))
        }
    }
}

/// Parse model output as a structured signal
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence. The
/// signal is matched case-insensitively and confidence is clamped to 0..=100.
pub fn parse_signal(raw: &str) -> Result<SignalRecord, SignalParseError> {
    let body = strip_code_fence(raw.trim());
    if !body.starts_with('{') {
        return Err(SignalParseError::NotJson);
    }

    let parsed: RawSignal = serde_json::from_str(body)?;
    Ok(SignalRecord {
        classification: parsed.signal.parse()?,
        confidence: parsed.confidence.value()?,
        rationale: parsed.reasoning,
    })
}

/// Strip a surrounding ```` ``` ```` / ```` ```json ```` fence, if any
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
