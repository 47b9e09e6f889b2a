//! Command-line interface for the hedge relay
//!
//! # Usage
//!
//! ```bash
//! export XAI_API_KEY="xai-..."
//!
//! agent-cli chat "What moved the market today?"
//! agent-cli analyze --state run.json --out run.json
//! agent-cli visualize --state run.json
//! agent-cli generate --prompt "A bull market on the moon"
//! ```

mod output;

use agent_core::{Agent, AgentState, ProgressLog};
use agent_hedge::{HedgeConfig, ImageAnalysisAgent, Relay, VisualGenerationAgent};
use agent_llm::Message;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "CLI for the hedge-fund LLM relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a single message to the chat model
    Chat {
        /// Message text
        #[arg(required = true)]
        message: Vec<String>,

        /// Optional system prompt sent before the message
        #[arg(long)]
        system: Option<String>,
    },

    /// Run chart analysis over every ticker in a state file
    Analyze(StateArgs),

    /// Generate one visual per ticker in a state file
    Visualize(StateArgs),

    /// Generate a single image and print its URL
    Generate {
        /// Prompt; the generic default is used when omitted
        #[arg(long)]
        prompt: Option<String>,
    },
}

#[derive(Args, Debug)]
struct StateArgs {
    /// Pipeline state JSON file
    #[arg(long)]
    state: PathBuf,

    /// Write the updated state here
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print progress updates after the run
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_dotenv();
    let app = agent_utils::Config::from_env("agent-cli");
    agent_utils::init_tracing_with(&app.log_filter, app.log_format());

    let cli = Cli::parse();

    let config = HedgeConfig::from_env()?;
    let relay = Arc::new(Relay::from_config(&config)?);

    match cli.command {
        Command::Chat { message, system } => {
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(message.join(" ")));

            println!("{}", relay.chat(messages).await?);
        }
        Command::Analyze(args) => {
            let progress = Arc::new(ProgressLog::new());
            let agent = ImageAnalysisAgent::new(relay, progress.clone())
                .with_temperature(config.analysis_temperature);
            let state = run_agent(&agent, &args).await?;

            println!("{}", output::signals_table(&state)?);
            finish(&args, &progress, state)?;
        }
        Command::Visualize(args) => {
            let progress = Arc::new(ProgressLog::new());
            let agent = VisualGenerationAgent::new(relay, progress.clone());
            let state = run_agent(&agent, &args).await?;

            println!("{}", output::visuals_table(&state)?);
            finish(&args, &progress, state)?;
        }
        Command::Generate { prompt } => {
            println!("{}", relay.generate_image(prompt.as_deref()).await?);
        }
    }

    Ok(())
}

async fn run_agent(agent: &dyn Agent, args: &StateArgs) -> anyhow::Result<AgentState> {
    let mut state = load_state(&args.state)?;
    info!(agent = agent.name(), state = %args.state.display(), "Running agent");
    agent.run(&mut state).await?;
    Ok(state)
}

fn finish(args: &StateArgs, progress: &ProgressLog, state: AgentState) -> anyhow::Result<()> {
    if args.progress {
        println!("{}", output::progress_table(&progress.events()));
    }
    if let Some(out) = &args.out {
        save_state(out, state)?;
        info!(path = %out.display(), "State written");
    }
    Ok(())
}

fn load_state(path: &Path) -> anyhow::Result<AgentState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("State file {} is not valid JSON", path.display()))?;
    Ok(AgentState::from_value(value)?)
}

fn save_state(path: &Path, state: AgentState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&state.into_value())?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write state file {}", path.display()))
}
