//! Tools the responder can call
//!
//! Tools are stateless singletons; all per-call context arrives through
//! `ToolContext`.

mod search_provider;
mod web_search;

pub use search_provider::{
    SearchError, SearchHit, SearchProvider, SearchResponse, TavilySearchProvider,
};
pub use web_search::{WebSearchTool, DEFAULT_SEARCH_RESULTS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// All context needed for a tool invocation.
///
/// Created fresh for each tool call.
#[derive(Clone)]
pub struct ToolContext {
    /// Cancellation signal for long-running operations
    pub cancel: CancellationToken,

    /// The session this tool is executing within
    pub session_id: String,
}

impl ToolContext {
    pub fn new(cancel: CancellationToken, session_id: impl Into<String>) -> Self {
        Self {
            cancel,
            session_id: session_id.into(),
        }
    }
}

/// Trait for tools that can be executed by the agent
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description for LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool with all context provided via `ToolContext`
    ///
    /// Long-running tools should monitor `ctx.cancel` and return promptly
    /// when it fires.
    async fn run(&self, input: Value, ctx: ToolContext) -> ToolOutput;
}

/// Collection of tools offered to the responder
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Standard registry: the web search tool backed by `provider`
    pub fn standard(provider: Arc<dyn SearchProvider>, default_max_results: u32) -> Self {
        Self::with_tools(vec![Arc::new(WebSearchTool::new(
            provider,
            default_max_results,
        ))])
    }

    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Get all tool definitions for LLM
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name with context; `None` if no such tool exists
    pub async fn execute(&self, name: &str, input: Value, ctx: ToolContext) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                return Some(tool.run(input, ctx).await);
            }
        }
        None
    }
}
