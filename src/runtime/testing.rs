//! Mock implementations for testing
//!
//! These mocks enable turn-level testing without real I/O.

use super::traits::{ResponderModel, ToolInvoker};
use crate::history::{Message, ToolCallRequest, ToolResult};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ToolDefinition};
use crate::state_machine::Reply;
use crate::tools::{SearchError, SearchHit, SearchProvider, SearchResponse, ToolContext};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Responder
// ============================================================================

/// Mock responder that returns queued replies
pub struct MockResponder {
    replies: Mutex<VecDeque<Result<Reply, LlmError>>>,
    /// Returned once the queue is empty
    fallback: Option<Reply>,
    delay: Option<Duration>,
    /// Message sequence passed to each call
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `reply` whenever nothing is queued. Tool call ids get a
    /// per-call suffix so repeated replies never reuse an id.
    pub fn always(mut self, reply: Reply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponderModel for MockResponder {
    async fn respond(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<Reply, LlmError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages.to_vec());
            calls.len()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.replies.lock().unwrap().pop_front();
        match queued {
            Some(result) => result,
            None => match self.fallback.clone() {
                Some(Reply::ToolCalls { text, calls }) => Ok(Reply::ToolCalls {
                    text,
                    calls: calls
                        .into_iter()
                        .map(|mut call| {
                            call.id = format!("{}-{call_number}", call.id);
                            call
                        })
                        .collect(),
                }),
                Some(reply) => Ok(reply),
                None => Err(LlmError::network("No mock reply queued")),
            },
        }
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock Tool Invoker
// ============================================================================

/// Mock tool invoker with predefined outputs per tool name and optional
/// per-call latency
pub struct MockToolInvoker {
    outputs: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    invocations: Mutex<Vec<ToolCallRequest>>,
    completed: Mutex<Vec<String>>,
}

impl MockToolInvoker {
    pub fn new() -> Self {
        Self {
            outputs: HashMap::new(),
            delays: HashMap::new(),
            invocations: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool that always returns `output`
    pub fn with_output(mut self, name: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), output.into());
        self
    }

    /// Delay the call with this id
    pub fn with_delay(mut self, call_id: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(call_id.into(), delay);
        self
    }

    /// Calls in the order they started
    pub fn recorded_invocations(&self) -> Vec<ToolCallRequest> {
        self.invocations.lock().unwrap().clone()
    }

    /// Call ids in the order they finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

impl Default for MockToolInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for MockToolInvoker {
    async fn invoke(&self, request: &ToolCallRequest, ctx: ToolContext) -> ToolResult {
        self.invocations.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delays.get(&request.id) {
            tokio::select! {
                () = tokio::time::sleep(*delay) => {}
                () = ctx.cancel.cancelled() => {
                    return ToolResult::error(&request.id, "cancelled");
                }
            }
        }
        self.completed.lock().unwrap().push(request.id.clone());
        match self.outputs.get(&request.name) {
            Some(output) => ToolResult::success(&request.id, output.clone()),
            None => ToolResult::error(&request.id, format!("Unknown tool: {}", request.name)),
        }
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.outputs
            .keys()
            .map(|name| ToolDefinition {
                name: name.clone(),
                description: format!("Mock {name}"),
                input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            })
            .collect()
    }
}

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Search Provider
// ============================================================================

/// Mock search provider returning fixed hits (truncated to the requested
/// count) or a fixed error
pub struct MockSearchProvider {
    hits: Vec<SearchHit>,
    error: Option<SearchError>,
    delay: Option<Duration>,
    queries: Mutex<Vec<(String, u32)>>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            error: None,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    pub fn with_error(mut self, error: SearchError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recorded_queries(&self) -> Vec<(String, u32)> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<SearchResponse, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_results));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(SearchResponse {
            results: self
                .hits
                .iter()
                .take(max_results as usize)
                .cloned()
                .collect(),
        })
    }
}
