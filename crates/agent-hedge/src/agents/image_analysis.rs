//! Chart image analysis agent

use agent_core::{Agent, AgentMessage, AgentOutput, AgentState, Error, ProgressReporter, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::prompts::SIGNAL_ANALYSIS_PROMPT;
use crate::relay::{AnalysisRequest, Relay};
use crate::signal::SignalRecord;

/// Agent that turns chart images into trading signals
///
/// For every ticker with a chart on file (`data.images.<ticker>`) it asks the
/// vision model for a signal and stores the parsed [`SignalRecord`] under
/// `data.analyst_signals.image_analysis_agent`. Tickers without a chart are
/// skipped: they get no entry and no progress update.
pub struct ImageAnalysisAgent {
    relay: Arc<Relay>,
    progress: Arc<dyn ProgressReporter>,
    temperature: f32,
}

impl ImageAnalysisAgent {
    /// Name used for progress updates, the state key and emitted messages
    pub const NAME: &'static str = "image_analysis_agent";

    /// Create a new image analysis agent
    pub fn new(relay: Arc<Relay>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            relay,
            progress,
            temperature: 0.01,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Agent for ImageAnalysisAgent {
    async fn run(&self, state: &mut AgentState) -> Result<AgentOutput> {
        let tickers = state.tickers()?;
        let mut analysis: BTreeMap<String, SignalRecord> = BTreeMap::new();

        for ticker in &tickers {
            let Some(reference) = state.image_for(ticker).map(str::to_owned) else {
                debug!(ticker = %ticker, "No chart image on file, skipping");
                continue;
            };

            self.progress
                .update_status(Self::NAME, ticker, "Analyzing chart image");

            let request = AnalysisRequest::from_reference(&reference)
                .await?
                .with_prompt(SIGNAL_ANALYSIS_PROMPT)
                .with_temperature(self.temperature);
            let response = self.relay.analyze_image(request).await?;

            let record = SignalRecord::from_model_output(&response);
            info!(
                ticker = %ticker,
                signal = %record.classification,
                confidence = record.confidence,
                "Chart analyzed"
            );
            analysis.insert(ticker.clone(), record);

            self.progress.update_status(Self::NAME, ticker, "Done");
        }

        let signals = serde_json::to_value(&analysis)
            .map_err(|e| Error::ProcessingFailed(format!("Failed to serialize signals: {e}")))?;
        let content = signals.to_string();
        state.set_analyst_signals(Self::NAME, signals);

        Ok(AgentOutput::with_message(AgentMessage::new(Self::NAME, content)))
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use crate::testing::{MockImages, MockLlm, completion, relay_with};
    use agent_core::ProgressLog;
    use agent_llm::LLMError;
    use serde_json::json;

    fn agent(llm: MockLlm) -> (ImageAnalysisAgent, Arc<ProgressLog>) {
        let log = Arc::new(ProgressLog::new());
        let agent = ImageAnalysisAgent::new(Arc::new(relay_with(llm, MockImages::new())), log.clone());
        (agent, log)
    }

    #[tokio::test]
    async fn test_only_tickers_with_images_get_entries() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .withf(|req| req.temperature == Some(0.01) && req.model == "grok-2-vision-latest")
            .times(1)
            .returning(|_| {
                Ok(completion(
                    r#"{"signal":"bullish","confidence":85,"reasoning":"uptrend"}"#,
                ))
            });

        let (agent, log) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA", "BBB"])
            .with_image("AAA", "https://charts.example/aaa.png");

        let output = agent.run(&mut state).await.unwrap();

        let signals = state.analyst_signals(ImageAnalysisAgent::NAME).unwrap();
        assert_eq!(
            signals,
            &json!({"AAA": {"signal": "bullish", "confidence": 85, "reasoning": "uptrend"}})
        );
        assert!(signals.get("BBB").is_none());

        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].name, "image_analysis_agent");
        let emitted: serde_json::Value = serde_json::from_str(&output.messages[0].content).unwrap();
        assert_eq!(&emitted, signals);

        let statuses: Vec<_> = log
            .events()
            .into_iter()
            .map(|e| (e.ticker, e.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("AAA".to_string(), "Analyzing chart image".to_string()),
                ("AAA".to_string(), "Done".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_prose_response_becomes_neutral_record() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .returning(|_| Ok(completion("Uptrend confirmed")));

        let (agent, _) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA"])
            .with_image("AAA", "data:image/png;base64,AAAA");

        agent.run(&mut state).await.unwrap();

        let records: BTreeMap<String, SignalRecord> = serde_json::from_value(
            state
                .analyst_signals(ImageAnalysisAgent::NAME)
                .unwrap()
                .clone(),
        )
        .unwrap();
        assert_eq!(records["AAA"].classification, Signal::Neutral);
        assert_eq!(records["AAA"].confidence, 50.0);
        assert_eq!(records["AAA"].rationale, "Uptrend confirmed");
    }

    #[tokio::test]
    async fn test_tickers_processed_in_order() {
        let mut llm = MockLlm::new();
        let mut seq = mockall::Sequence::new();
        for url in ["https://c/b.png", "https://c/a.png"] {
            llm.expect_complete()
                .withf(move |req| format!("{:?}", req.messages).contains(url))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(completion("flat")));
        }

        let (agent, log) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["BBB", "AAA"])
            .with_image("AAA", "https://c/a.png")
            .with_image("BBB", "https://c/b.png");

        agent.run(&mut state).await.unwrap();

        let tickers: Vec<_> = log.latest().into_iter().map(|e| e.ticker).collect();
        assert_eq!(tickers, vec!["BBB", "AAA"]);
    }

    #[tokio::test]
    async fn test_local_chart_file_is_inlined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aaa.png");
        std::fs::write(&path, b"fake png bytes").unwrap();

        let mut llm = MockLlm::new();
        llm.expect_complete()
            .withf(|req| {
                let debug = format!("{:?}", req.messages);
                debug.contains("data:image/png;base64,ZmFrZSBwbmcgYnl0ZXM=")
            })
            .times(1)
            .returning(|_| Ok(completion(r#"{"signal":"bearish","confidence":40,"reasoning":"x"}"#)));

        let (agent, _) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA"])
            .with_image("AAA", path.to_string_lossy());

        agent.run(&mut state).await.unwrap();
        assert_eq!(
            state.analyst_signals(ImageAnalysisAgent::NAME).unwrap()["AAA"]["signal"],
            json!("bearish")
        );
    }

    #[tokio::test]
    async fn test_unreadable_chart_file_aborts_run() {
        let mut llm = MockLlm::new();
        llm.expect_complete().never();

        let (agent, log) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA"])
            .with_image("AAA", "/definitely/not/here.png");

        let err = agent.run(&mut state).await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
        assert_eq!(log.latest()[0].status, "Analyzing chart image");
    }

    #[tokio::test]
    async fn test_remote_failure_aborts_run() {
        let mut llm = MockLlm::new();
        llm.expect_complete()
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let (agent, _) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA"])
            .with_image("AAA", "https://c/a.png");

        let err = agent.run(&mut state).await.unwrap_err();
        assert!(err.to_string().contains("Invalid API key"));
        assert!(state.analyst_signals(ImageAnalysisAgent::NAME).is_none());
    }

    #[tokio::test]
    async fn test_missing_tickers_is_an_error() {
        let mut llm = MockLlm::new();
        llm.expect_complete().never();

        let (agent, _) = agent(llm);
        let mut state = AgentState::new();
        assert!(matches!(
            agent.run(&mut state).await,
            Err(Error::MissingStateKey(_))
        ));
    }

    #[tokio::test]
    async fn test_ticker_without_chart_is_skipped_without_status() {
        let mut llm = MockLlm::new();
        llm.expect_complete().never();

        let (agent, log) = agent(llm);
        let mut state = AgentState::new()
            .with_tickers(["AAA", "BBB"])
            .with_image("BBB", "");

        agent.run(&mut state).await.unwrap();

        // No entry and no "Analyzing chart image" for tickers with nothing to analyze
        assert_eq!(
            state.analyst_signals(ImageAnalysisAgent::NAME),
            Some(&json!({}))
        );
        assert!(log.events().is_empty());
    }
}
