//! Configuration management utilities

use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};

/// Process-level configuration shared by the binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, etc.)
    pub environment: String,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Log output format name ("pretty" or "json")
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "agent-rs".to_string(),
            environment: "development".to_string(),
            log_filter: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Build from `APP_ENV`, `LOG_FILTER` and `LOG_FORMAT`, defaulting the rest
    pub fn from_env(app_name: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self {
            app_name: app_name.into(),
            environment: std::env::var("APP_ENV").unwrap_or(defaults.environment),
            log_filter: std::env::var("LOG_FILTER").unwrap_or(defaults.log_filter),
            log_format: std::env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Parsed log format
    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.log_format)
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Load variables from a `.env` file in the working directory or its parents
///
/// Variables already set in the process environment are left alone. Returns
/// whether a file was found.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_flag() {
        let config = Config {
            environment: "Production".to_string(),
            ..Config::default()
        };
        assert!(config.is_production());
    }
}
