//! LLM Provider Abstraction
//!
//! Defines the uniform completion request/result shape and the `LlmProvider`
//! trait every adapter implements. Adapters tag their failures with an
//! [`ErrorCategory`] where they are raised.
//!
//! ## Modules
//!
//! - `chain`: priority-ordered provider fallback
//! - `ollama`: local model runtime (completion-style API)
//! - `openrouter`: cloud router with model-level fallback
//! - `openai`: direct vendor, single model

mod chain;
mod ollama;
mod openai;
mod openrouter;
mod prompt_utils;

pub use chain::{ChainAttemptResult, ChainStats, ProviderChain};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use openrouter::OpenRouterProvider;
pub use prompt_utils::flatten_messages;

pub use crate::types::{ErrorCategory, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AiConfig, ProviderKind};
use crate::types::{DocError, Result};

// =============================================================================
// Request / Result
// =============================================================================

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a chat prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion call: ordered messages plus sampling temperature
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature, clamped to [0, 1]
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f32) -> Self {
        Self {
            messages,
            temperature: temperature.clamp(0.0, 1.0),
        }
    }

    /// Common shape: one system instruction followed by one user prompt
    pub fn system_user(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self::new(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
        )
    }
}

/// Successful completion, attributed to the provider and model that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    /// Raw text returned by the model
    pub content: String,
    /// Token count reported by the provider (0 when unreported)
    pub tokens_used: u32,
    /// Model that actually answered
    pub model: String,
    /// Provider that actually answered
    pub provider: String,
}

/// Shared provider handle; adapters are immutable after construction.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Uniform adapter contract over heterogeneous provider wire formats
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion. Failures carry a category set by the adapter.
    async fn complete(&self, request: &CompletionRequest)
    -> std::result::Result<CompletionResult, LlmError>;

    /// Provider name for logging and attribution
    fn name(&self) -> &str;

    /// Primary model identifier
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;
}

/// Build the adapter for one provider slot
pub fn create_provider(kind: ProviderKind, config: &AiConfig) -> Result<SharedProvider> {
    let settings = config.settings(kind);
    match kind {
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::new(settings)?)),
        ProviderKind::OpenRouter => Ok(Arc::new(OpenRouterProvider::new(settings)?)),
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(settings)?)),
    }
}

/// Build adapters for every active provider, in priority order
pub fn create_active_providers(config: &AiConfig) -> Result<Vec<SharedProvider>> {
    config
        .active_providers()
        .into_iter()
        .map(|kind| create_provider(kind, config))
        .collect()
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_clamped() {
        let req = CompletionRequest::system_user("s", "u", 1.7);
        assert_eq!(req.temperature, 1.0);
        let req = CompletionRequest::system_user("s", "u", -0.2);
        assert_eq!(req.temperature, 0.0);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
    }

    #[test]
    fn test_no_active_providers_builds_nothing() {
        let providers = create_active_providers(&AiConfig::default()).unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn test_active_providers_built_in_order() {
        let mut config = AiConfig::default();
        config.ollama.enabled = true;
        config.openai.enabled = true;
        config.openai.api_key = Some("k".to_string());

        let providers = create_active_providers(&config).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["ollama", "openai"]);
    }
}
