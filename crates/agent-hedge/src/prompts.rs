//! Prompt text used by the relays and agents

use minijinja::{Environment, context};

/// Prompt for ad-hoc chart analysis when the caller supplies none
pub const DEFAULT_ANALYSIS_PROMPT: &str = "Analyze this financial chart and provide insights.";

/// Prompt the chart-analysis agent sends with every chart
pub const SIGNAL_ANALYSIS_PROMPT: &str = "Analyze this stock chart and provide a trading signal \
(bullish, bearish, or neutral) with a confidence level (0-100). Explain your reasoning.";

/// Prompt for image generation when the caller supplies none
pub const DEFAULT_GENERATION_PROMPT: &str = "Generate a chart representing hedge fund performance.";

/// Portfolio action assumed when the manager has not decided on a ticker
pub const DEFAULT_ACTION: &str = "hold";

const VISUAL_PROMPT: &str =
    "Visualize a {{ action }} market trend for {{ ticker }} in a futuristic Web 3 style";

/// Render the per-ticker visual generation prompt
pub fn visual_prompt(action: &str, ticker: &str) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    env.render_str(VISUAL_PROMPT, context! { action, ticker })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_prompt() {
        assert_eq!(
            visual_prompt("buy", "AAPL").unwrap(),
            "Visualize a buy market trend for AAPL in a futuristic Web 3 style"
        );
    }

    #[test]
    fn test_visual_prompt_is_not_html_escaped() {
        assert_eq!(
            visual_prompt("hold", "BRK&B").unwrap(),
            "Visualize a hold market trend for BRK&B in a futuristic Web 3 style"
        );
    }

    #[test]
    fn test_signal_prompt_text() {
        assert_eq!(
            SIGNAL_ANALYSIS_PROMPT,
            "Analyze this stock chart and provide a trading signal (bullish, bearish, or neutral) \
             with a confidence level (0-100). Explain your reasoning."
        );
    }
}
