//! Chat completion providers
//!
//! `LlmService` is the seam between the responder and a concrete provider.
//! Every service handed out by the registry is wrapped in `LoggingService`.

mod error;
mod models;
mod openai;
mod registry;
mod types;

#[cfg(test)]
mod proptests;

pub use error::{LlmError, LlmErrorKind};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn model_id(&self) -> &str;
}

/// Records one log line per completion
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration_ms = start.elapsed().as_millis();
        let model = self.inner.model_id();

        match &result {
            Ok(response) => tracing::info!(
                model,
                duration_ms,
                messages = request.messages.len(),
                prompt_tokens = response.usage.prompt_tokens,
                completion_tokens = response.usage.completion_tokens,
                total_tokens = response.usage.total(),
                finish_reason = ?response.finish_reason,
                tool_calls = response.tool_calls.len(),
                "Completion finished"
            ),
            Err(e) => tracing::error!(
                model,
                duration_ms,
                kind = ?e.kind,
                status = ?e.status,
                transient = e.kind.is_transient(),
                error = %e,
                "Completion failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
