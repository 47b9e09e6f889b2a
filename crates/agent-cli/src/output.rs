//! Table rendering for command results

use agent_core::{AgentState, ProgressEvent};
use agent_hedge::{ImageAnalysisAgent, SignalRecord};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::collections::BTreeMap;

fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Signals written by the chart-analysis agent, in ticker order
pub fn signals_table(state: &AgentState) -> anyhow::Result<Table> {
    let mut table = table(&["Ticker", "Signal", "Confidence", "Reasoning"]);

    let records: BTreeMap<String, SignalRecord> = match state.analyst_signals(ImageAnalysisAgent::NAME) {
        Some(value) => serde_json::from_value(value.clone())?,
        None => BTreeMap::new(),
    };

    for ticker in state.tickers()? {
        match records.get(&ticker) {
            Some(record) => table.add_row(vec![
                ticker,
                record.classification.to_string(),
                format!("{:.0}", record.confidence),
                record.rationale.clone(),
            ]),
            None => table.add_row(vec![ticker, "-".to_string(), "-".to_string(), "no chart".to_string()]),
        };
    }

    Ok(table)
}

/// Generated visuals, in ticker order
pub fn visuals_table(state: &AgentState) -> anyhow::Result<Table> {
    let mut table = table(&["Ticker", "Visual"]);

    for ticker in state.tickers()? {
        let visual = state
            .visuals()
            .and_then(|visuals| visuals.get(&ticker))
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string();
        table.add_row(vec![ticker, visual]);
    }

    Ok(table)
}

/// Progress updates reported during a run
pub fn progress_table(events: &[ProgressEvent]) -> Table {
    let mut table = table(&["Time", "Agent", "Ticker", "Status"]);
    for event in events {
        table.add_row(vec![
            event.timestamp.format("%H:%M:%S%.3f").to_string(),
            event.agent.clone(),
            event.ticker.clone(),
            event.status.clone(),
        ]);
    }
    table
}
