use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_CATALOG_PATH: &str = "database.json";
const DEFAULT_PORT: &str = "8001";
const DEFAULT_LLM_TIMEOUT_SECS: &str = "60";

/// Application configuration loaded from environment variables.
/// Fails at startup if a provided value cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional. Without it the question flow still works, but analysis
    /// requests fail with a configuration error.
    pub anthropic_api_key: Option<String>,
    pub catalog_path: String,
    pub port: u16,
    /// Upper bound on any single model call, including the three fan-out calls.
    pub llm_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            catalog_path: env_or("CATALOG_PATH", DEFAULT_CATALOG_PATH),
            port: env_or("PORT", DEFAULT_PORT)
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            llm_timeout: parse_timeout(&env_or("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS))?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("LLM_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"))?;
    if secs == 0 {
        bail!("LLM_TIMEOUT_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
