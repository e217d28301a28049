//! Centralized model definitions
//!
//! All supported models live in one table so the registry, the API model
//! listing and configuration validation agree on what exists.

use super::openai::{OpenAIModel, OpenAIService};
use super::{LlmError, LlmService};
use std::sync::Arc;
use std::time::Duration;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gpt-4o")
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
    /// Provider-specific model variant
    pub model: OpenAIModel,
}

impl ModelDef {
    /// Create the service for this model
    pub fn create(
        &self,
        api_key: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmService>, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::auth(format!(
                "{} requires OPENAI_API_KEY",
                self.id
            )));
        }
        let service = OpenAIService::new(api_key.to_string(), self.model, base_url, timeout)?;
        Ok(Arc::new(service))
    }
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gpt-4o",
            description: "GPT-4o (default, strong tool use)",
            context_window: 128_000,
            model: OpenAIModel::GPT4o,
        },
        ModelDef {
            id: "gpt-4o-mini",
            description: "GPT-4o mini (fast, cheap)",
            context_window: 128_000,
            model: OpenAIModel::GPT4oMini,
        },
        ModelDef {
            id: "gpt-4.1",
            description: "GPT-4.1 (long context)",
            context_window: 1_047_576,
            model: OpenAIModel::GPT41,
        },
        ModelDef {
            id: "gpt-4.1-mini",
            description: "GPT-4.1 mini (long context, cheap)",
            context_window: 1_047_576,
            model: OpenAIModel::GPT41Mini,
        },
    ]
}

/// Look up a model definition by id
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}
