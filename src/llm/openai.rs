//! `OpenAI` chat completions client, also used for compatible gateways

use super::types::{ChatMessage, FinishReason, LlmRequest, LlmResponse, ToolDefinition, Usage};
use super::{LlmError, LlmService};
use crate::history::ToolCallRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Supported chat-completions models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIModel {
    GPT4o,
    GPT4oMini,
    GPT41,
    GPT41Mini,
}

impl OpenAIModel {
    pub fn api_name(self) -> &'static str {
        match self {
            OpenAIModel::GPT4o => "gpt-4o",
            OpenAIModel::GPT4oMini => "gpt-4o-mini",
            OpenAIModel::GPT41 => "gpt-4.1",
            OpenAIModel::GPT41Mini => "gpt-4.1-mini",
        }
    }
}

pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: OpenAIModel,
    endpoint: String,
}

impl OpenAIService {
    pub fn new(
        api_key: String,
        model: OpenAIModel,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let endpoint = format!(
            "{}/chat/completions",
            base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            endpoint,
        })
    }

    fn build_body(&self, request: &LlmRequest) -> CompletionBody {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(WireMessage::text("system", request.system.clone()));
        }
        messages.extend(request.messages.iter().map(to_wire));

        CompletionBody {
            model: self.model.api_name().to_string(),
            messages,
            tools: (!request.tools.is_empty())
                .then(|| request.tools.iter().map(WireTool::from).collect()),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }
}

/// Arguments go back to the provider as it sent them. Unparseable arguments
/// are held as a JSON string of the raw text.
fn encode_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn to_wire(message: &ChatMessage) -> WireMessage {
    match message {
        ChatMessage::User { content } => WireMessage::text("user", content.clone()),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => WireMessage {
            role: "assistant".to_string(),
            // Providers reject an assistant message with neither field
            content: content
                .clone()
                .or_else(|| tool_calls.is_empty().then(String::new)),
            tool_calls: (!tool_calls.is_empty()).then(|| {
                tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        r#type: "function".to_string(),
                        function: WireFunctionCall {
                            name: call.name.clone(),
                            arguments: encode_arguments(&call.arguments),
                        },
                    })
                    .collect()
            }),
            tool_call_id: None,
        },
        ChatMessage::Tool {
            call_id,
            content,
            is_error,
        } => WireMessage {
            role: "tool".to_string(),
            content: Some(if *is_error {
                format!("Error: {content}")
            } else {
                content.clone()
            }),
            tool_calls: None,
            tool_call_id: Some(call_id.clone()),
        },
    }
}

fn normalize_response(resp: CompletionResponse) -> Result<LlmResponse, LlmError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::unknown("No choices in response"))?;

    let text = choice.message.content.filter(|t| !t.is_empty());

    let mut tool_calls = Vec::new();
    for call in choice.message.tool_calls.unwrap_or_default() {
        if call.function.name.is_empty() {
            return Err(LlmError::unknown(format!(
                "Tool call {} has an empty function name",
                call.id
            )));
        }
        // Unparseable arguments reach the tool as a raw string so it can
        // report the malformed call back to the model.
        let arguments = serde_json::from_str(&call.function.arguments)
            .unwrap_or(Value::String(call.function.arguments));
        tool_calls.push(ToolCallRequest::new(call.id, call.function.name, arguments));
    }

    if text.is_none() && tool_calls.is_empty() {
        return Err(LlmError::unknown(
            "Response contained neither text nor tool calls",
        ));
    }

    Ok(LlmResponse {
        text,
        tool_calls,
        finish_reason: FinishReason::parse(choice.finish_reason.as_deref()),
        usage: resp.usage.map_or_else(Usage::default, |u| Usage {
            prompt_tokens: u64::from(u.prompt_tokens),
            completion_tokens: u64::from(u.completion_tokens),
        }),
    })
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = self.build_body(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&text)
                .map_or(text, |envelope| envelope.error.message);
            return Err(LlmError::from_status(status.as_u16(), &detail));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {text}"))
        })?;

        normalize_response(parsed)
    }

    fn model_id(&self) -> &str {
        self.model.api_name()
    }
}

// Wire format

#[derive(Debug, Serialize)]
pub(super) struct CompletionBody {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireTool {
    pub r#type: &'static str,
    pub function: WireFunction,
}

impl From<&ToolDefinition> for WireTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: WireFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.input_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireToolCall {
    pub id: String,
    pub r#type: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompletionChoice {
    pub message: WireMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
pub(super) struct WireUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
