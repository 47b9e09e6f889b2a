//! Hedge relay HTTP server
//!
//! # Usage
//!
//! ```bash
//! export XAI_API_KEY="xai-..."
//! export HEDGE_BIND_ADDR="0.0.0.0:5000"   # optional
//!
//! cargo run --bin hedge-server -p agent-hedge
//! ```

use agent_hedge::{HedgeConfig, Relay, server};
use agent_utils::{Config, init_tracing_with, load_dotenv};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let found_dotenv = load_dotenv();

    let app = Config::from_env("hedge-server");
    init_tracing_with(&app.log_filter, app.log_format());
    if found_dotenv {
        info!("Loaded environment from .env");
    }

    let config = HedgeConfig::from_env()?;
    info!(
        environment = %app.environment,
        api_base = %config.api_base,
        chat_model = %config.chat_model,
        vision_model = %config.vision_model,
        image_model = %config.image_model,
        "Starting hedge relay"
    );

    let relay = Arc::new(Relay::from_config(&config)?);
    server::serve(&config, relay).await?;

    Ok(())
}
