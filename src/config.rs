//! Application configuration from the environment
//!
//! A `.env` file in the working directory is loaded first (if present), then
//! every setting is read from process environment variables. Numbers that do
//! not parse fall back to their defaults.

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::llm::LlmConfig;
use crate::runtime::EngineConfig;
use crate::state_machine::DEFAULT_MAX_ROUND_TRIPS;
use crate::tools::DEFAULT_SEARCH_RESULTS;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SEARCH_TOPIC: &str = "general";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Search provider settings
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub tavily_api_key: Option<String>,
    pub tavily_endpoint: Option<String>,
    pub topic: String,
    pub max_results: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub engine: EngineConfig,
    /// Messages kept per session
    pub history_capacity: usize,
    pub port: u16,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str, default| parse_or(non_empty(key), key, default);

        let llm_timeout = Duration::from_secs(parsed("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS));
        let tool_timeout =
            Duration::from_secs(parsed("TOOL_TIMEOUT_SECS", DEFAULT_TOOL_TIMEOUT_SECS));

        Self {
            llm: LlmConfig {
                openai_api_key: non_empty("OPENAI_API_KEY"),
                base_url: non_empty("OPENAI_BASE_URL"),
                default_model: non_empty("DEFAULT_MODEL"),
                request_timeout: llm_timeout,
            },
            search: SearchConfig {
                tavily_api_key: non_empty("TAVILY_API_KEY"),
                tavily_endpoint: non_empty("TAVILY_ENDPOINT"),
                topic: non_empty("SEARCH_TOPIC").unwrap_or_else(|| DEFAULT_SEARCH_TOPIC.to_string()),
                max_results: parse_or(
                    non_empty("SEARCH_MAX_RESULTS"),
                    "SEARCH_MAX_RESULTS",
                    DEFAULT_SEARCH_RESULTS,
                ),
            },
            engine: EngineConfig {
                max_round_trips: parse_or(
                    non_empty("MAX_ROUND_TRIPS"),
                    "MAX_ROUND_TRIPS",
                    DEFAULT_MAX_ROUND_TRIPS,
                ),
                responder_timeout: llm_timeout,
                tool_timeout,
            },
            history_capacity: parse_or(
                non_empty("MAX_HISTORY_LENGTH"),
                "MAX_HISTORY_LENGTH",
                DEFAULT_HISTORY_CAPACITY,
            ),
            port: parse_or(non_empty("WEB_SEARCH_AGENT_PORT"), "WEB_SEARCH_AGENT_PORT", DEFAULT_PORT),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
    }
}
