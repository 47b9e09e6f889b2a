//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the agent-rs workspace,
//! including logging setup and process configuration.

pub mod config;
pub mod logging;

pub use config::{Config, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
