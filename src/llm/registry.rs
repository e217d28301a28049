//! Model registry for managing available LLM services

use super::models::{all_models, find_model};
use super::{LlmService, LoggingService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Configuration for LLM providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Alternate OpenAI-compatible base URL (e.g. a gateway)
    pub base_url: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: None,
            default_model: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        if let Some(api_key) = config.openai_api_key.as_deref() {
            for model_def in all_models() {
                match model_def.create(api_key, config.base_url.as_deref(), config.request_timeout)
                {
                    Ok(service) => {
                        services.insert(
                            model_def.id.to_string(),
                            Arc::new(LoggingService::new(service)),
                        );
                    }
                    Err(e) => {
                        tracing::debug!(model = model_def.id, error = %e, "Model unavailable");
                    }
                }
            }
        }

        let default_model = config
            .default_model
            .clone()
            .filter(|id| {
                let known = find_model(id).is_some();
                if !known {
                    tracing::warn!(model = %id, "Unknown DEFAULT_MODEL, falling back to {DEFAULT_MODEL}");
                }
                known
            })
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                description: def.description.to_string(),
                context_window: def.context_window,
            })
            .collect()
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
