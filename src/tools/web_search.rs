//! Web search tool

use super::{SearchProvider, Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Upper bound on `max_results` a caller may request
pub const MAX_SEARCH_RESULTS: u32 = 20;

/// Results returned when the call does not ask for a count
pub const DEFAULT_SEARCH_RESULTS: u32 = 5;

pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
    default_max_results: u32,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>, default_max_results: u32) -> Self {
        Self {
            provider,
            default_max_results: default_max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
    #[serde(default)]
    max_results: Option<i64>,
}

#[derive(Debug, Serialize)]
struct WebSearchPayload<'a> {
    query: &'a str,
    results: &'a [super::SearchHit],
}

impl WebSearchTool {
    /// Validate arguments, returning the query and result count
    fn parse_input(&self, input: Value) -> Result<(String, u32), String> {
        if let Value::String(raw) = &input {
            return Err(format!("Malformed arguments, expected a JSON object: {raw}"));
        }
        let parsed: WebSearchInput =
            serde_json::from_value(input).map_err(|e| format!("Invalid input: {e}"))?;

        let query = parsed.query.trim();
        if query.is_empty() {
            return Err("Invalid input: query must not be empty".to_string());
        }

        let max_results = match parsed.max_results {
            None => self.default_max_results,
            Some(n) => u32::try_from(n)
                .ok()
                .filter(|n| (1..=MAX_SEARCH_RESULTS).contains(n))
                .ok_or_else(|| {
                    format!("Invalid input: max_results must be between 1 and {MAX_SEARCH_RESULTS}")
                })?,
        };

        Ok((query.to_string(), max_results))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> String {
        "Search the web for current information. Returns titles, URLs and content snippets of the most relevant pages. Use it for anything recent or anything you are unsure about.".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_SEARCH_RESULTS,
                    "description": format!("Number of results to return (default {})", self.default_max_results)
                }
            }
        })
    }

    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput {
        let (query, max_results) = match self.parse_input(input) {
            Ok(parsed) => parsed,
            Err(message) => return ToolOutput::error(message),
        };

        let response = tokio::select! {
            () = ctx.cancel.cancelled() => {
                return ToolOutput::error("Search cancelled");
            }
            response = self.provider.search(&query, max_results) => response,
        };

        match response {
            Ok(response) => {
                tracing::info!(
                    session_id = %ctx.session_id,
                    provider = self.provider.name(),
                    query = %query,
                    results = response.results.len(),
                    "Web search completed"
                );
                let payload = WebSearchPayload {
                    query: &query,
                    results: &response.results,
                };
                match serde_json::to_string(&payload) {
                    Ok(json) => ToolOutput::success(json),
                    Err(e) => ToolOutput::error(format!("Failed to encode results: {e}")),
                }
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %ctx.session_id,
                    provider = self.provider.name(),
                    query = %query,
                    error = %e,
                    "Web search failed"
                );
                ToolOutput::error(format!("Web search failed: {e}"))
            }
        }
    }
}
