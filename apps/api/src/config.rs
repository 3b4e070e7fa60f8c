use std::time::Duration;

use anyhow::{Context, Result};

use crate::queue::QueueConfig;

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Minimum gap between LLM dispatches. 10s matches the provider's
    /// observed rate ceiling; lower it only with a higher-tier API key.
    pub llm_min_delay: Duration,
    /// Max LLM calls waiting in the queue before submissions are rejected.
    pub llm_queue_capacity: usize,
    /// Deadline for one LLM call once dispatched.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            llm_min_delay: Duration::from_millis(
                env_or("LLM_MIN_DELAY_MS", "10000")
                    .parse::<u64>()
                    .context("LLM_MIN_DELAY_MS must be a number of milliseconds")?,
            ),
            llm_queue_capacity: env_or("LLM_QUEUE_CAPACITY", "32")
                .parse::<usize>()
                .context("LLM_QUEUE_CAPACITY must be a positive integer")?,
            llm_timeout: Duration::from_secs(
                env_or("LLM_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            ),
        })
    }

    /// Queue settings for the Anthropic API, the one rate-limited resource
    /// this service talks to.
    pub fn llm_queue_config(&self) -> QueueConfig {
        QueueConfig {
            min_delay: self.llm_min_delay,
            capacity: self.llm_queue_capacity,
            operation_timeout: Some(self.llm_timeout),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
