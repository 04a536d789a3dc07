use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use extraction::SecretString;
use planner::PlannerConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database the catalog lives in memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub openai_api_key: SecretString,
    pub openai_model: Option<String>,
    pub tavily_api_key: SecretString,
    /// Search requests per second across all discovery runs.
    pub search_rps: u32,
    /// JSON file with planner weights and limits.
    pub planner_config_path: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: SecretString::new(
                env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            ),
            openai_model: env::var("OPENAI_MODEL").ok(),
            tavily_api_key: SecretString::new(
                env::var("TAVILY_API_KEY").context("TAVILY_API_KEY must be set")?,
            ),
            search_rps: env::var("SEARCH_RPS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("SEARCH_RPS must be a valid number")?,
            planner_config_path: env::var("PLANNER_CONFIG").ok().map(PathBuf::from),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }

    /// Planner tuning from `PLANNER_CONFIG`, or the defaults.
    pub fn planner_config(&self) -> Result<PlannerConfig> {
        let Some(path) = &self.planner_config_path else {
            return Ok(PlannerConfig::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read planner config {}", path.display()))?;
        parse_planner_config(&raw)
            .with_context(|| format!("Invalid planner config {}", path.display()))
    }
}

fn parse_planner_config(raw: &str) -> Result<PlannerConfig> {
    let config: PlannerConfig = serde_json::from_str(raw)?;
    config.validate()?;
    Ok(config)
}
