//! OpenRouter Cloud Router Provider
//!
//! One credential fronting many models. Tries the configured primary model,
//! then each fallback in order, moving on only when a model is rate limited
//! or unknown to the router. Any other failure ends the attempt immediately
//! so the chain can move to the next provider.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{info, warn};

use super::openai::{ChatCall, chat_completion};
use super::{CompletionRequest, CompletionResult, LlmProvider, build_http_client};
use crate::config::ProviderSettings;
use crate::constants::openrouter as router_constants;
use crate::types::{DocError, ErrorCategory, LlmError, Result};

const ATTRIBUTION_HEADERS: &[(&str, &str)] = &[
    ("HTTP-Referer", router_constants::REFERER),
    ("X-Title", router_constants::TITLE),
];

pub struct OpenRouterProvider {
    api_key: SecretString,
    api_base: String,
    /// Primary model followed by fallbacks, never empty
    models: Vec<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .finish()
    }
}

impl OpenRouterProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DocError::Config(
                    "OpenRouter API key not found. Set OPENROUTER_API_KEY or ai.openrouter.api_key"
                        .to_string(),
                )
            })?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            models: settings.model_chain(),
            client: build_http_client(Duration::from_secs(settings.timeout_secs))?,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn complete_with_model(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, LlmError> {
        chat_completion(ChatCall {
            client: &self.client,
            url: format!("{}/chat/completions", self.api_base),
            api_key: &self.api_key,
            extra_headers: ATTRIBUTION_HEADERS,
            provider: router_constants::NAME,
            model,
            request,
        })
        .await
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for (index, model) in self.models.iter().enumerate() {
            info!(
                "Generating with OpenRouter (model {}/{}: {}, temperature: {})",
                index + 1,
                self.models.len(),
                model,
                request.temperature
            );

            match self.complete_with_model(model, request).await {
                Ok(result) => {
                    if index > 0 {
                        info!("OpenRouter fallback model {} succeeded", model);
                    }
                    return Ok(result);
                }
                Err(e) if e.is_model_retryable() => {
                    match e.category {
                        ErrorCategory::NotFound => warn!(
                            "OpenRouter model {} not found, check configuration: {}",
                            model, e.message
                        ),
                        _ => warn!("OpenRouter model {} rate limited: {}", model, e.message),
                    }
                    last_error = Some(e);
                }
                Err(e) => {
                    warn!("OpenRouter model {} failed: {}", model, e.message);
                    return Err(e);
                }
            }
        }

        let last_message = last_error
            .map(|e| e.message)
            .unwrap_or_else(|| "no models configured".to_string());

        Err(LlmError::with_provider(
            ErrorCategory::Other,
            format!(
                "All {} OpenRouter models failed. Last error: {}",
                self.models.len(),
                last_message
            ),
            router_constants::NAME,
        ))
    }

    fn name(&self) -> &str {
        router_constants::NAME
    }

    fn model(&self) -> &str {
        self.models
            .first()
            .map(String::as_str)
            .unwrap_or(router_constants::DEFAULT_MODEL)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/models", self.api_base);

        match self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!("OpenRouter API check failed: {}", resp.status());
                false
            }
            Err(e) => {
                warn!("OpenRouter API check failed: {}", e);
                false
            }
        }
    }
}
