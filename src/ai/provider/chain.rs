//! Fallback Provider Chain
//!
//! Tries providers one at a time in fixed priority order (local model, cloud
//! router, direct vendor) and returns the first success. Providers are never
//! raced; a more expensive path is only paid for when the cheaper one failed.
//!
//! ## Strategy
//!
//! 1. Fail fast with a configuration error when no provider is configured
//! 2. Invoke each provider once, in order
//! 3. On success, return the result attributed to the provider and model that produced it
//! 4. On any failure, record it and move on to the next provider
//! 5. When every provider failed, report the last error

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{CompletionRequest, CompletionResult, LlmProvider, SharedProvider};
use crate::config::AiConfig;
use crate::types::{DocError, ErrorCategory, LlmError, Result};

/// Result of a single provider attempt
#[derive(Debug, Clone)]
pub struct ChainAttemptResult {
    pub provider_name: String,
    /// Model that answered, or the provider's primary model on failure
    pub model: String,
    pub success: bool,
    pub error: Option<LlmError>,
    pub duration_ms: u64,
}

/// Execution statistics for the chain
#[derive(Debug, Default)]
pub struct ChainStats {
    pub total_attempts: usize,
    pub successful_provider: Option<String>,
    pub attempts: Vec<ChainAttemptResult>,
    pub total_duration_ms: u64,
}

/// Priority-ordered fallback over configured providers
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<SharedProvider>,
}

impl ProviderChain {
    /// Create a chain over providers already in priority order
    pub fn new(providers: Vec<SharedProvider>) -> Self {
        Self { providers }
    }

    /// Build the chain from every active provider in configuration
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        Ok(Self::new(super::create_active_providers(config)?))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Execute with fallback across providers
    #[instrument(skip(self, request), fields(providers = self.providers.len()))]
    pub async fn execute(
        &self,
        request: &CompletionRequest,
    ) -> Result<(CompletionResult, ChainStats)> {
        if self.providers.is_empty() {
            return Err(DocError::NoProviders);
        }

        let mut stats = ChainStats::default();
        let start_time = Instant::now();
        let mut last_error: Option<LlmError> = None;

        for provider in &self.providers {
            let provider_name = provider.name().to_string();
            stats.total_attempts += 1;
            let attempt_start = Instant::now();

            debug!(
                attempt = stats.total_attempts,
                provider = %provider_name,
                model = provider.model(),
                "Chain attempt"
            );

            match provider.complete(request).await {
                Ok(result) => {
                    stats.attempts.push(ChainAttemptResult {
                        provider_name: provider_name.clone(),
                        model: result.model.clone(),
                        success: true,
                        error: None,
                        duration_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    stats.successful_provider = Some(provider_name);
                    stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

                    info!(
                        provider = %result.provider,
                        model = %result.model,
                        tokens = result.tokens_used,
                        attempts = stats.total_attempts,
                        "Chain succeeded"
                    );

                    return Ok((result, stats));
                }
                Err(err) => {
                    match err.category {
                        ErrorCategory::Unavailable => {
                            info!(provider = %provider_name, "Provider unavailable, trying next")
                        }
                        ErrorCategory::NotFound => warn!(
                            provider = %provider_name,
                            error = %err,
                            "Model not found, check configuration. Trying next provider"
                        ),
                        _ => warn!(
                            provider = %provider_name,
                            error = %err,
                            category = %err.category,
                            "Provider failed, trying next"
                        ),
                    }

                    stats.attempts.push(ChainAttemptResult {
                        provider_name,
                        model: provider.model().to_string(),
                        success: false,
                        error: Some(err.clone()),
                        duration_ms: attempt_start.elapsed().as_millis() as u64,
                    });
                    last_error = Some(err);
                }
            }
        }

        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        Err(DocError::ProvidersExhausted {
            attempts: stats.total_attempts,
            last_error: last_error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }

    /// Execute and drop the attempt statistics
    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult> {
        let (result, _stats) = self.execute(request).await?;
        Ok(result)
    }
}

#[async_trait]
impl LlmProvider for ProviderChain {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<CompletionResult, LlmError> {
        ProviderChain::complete(self, request)
            .await
            .map_err(|e| match e {
                DocError::Llm(inner) => inner,
                DocError::NoProviders => LlmError::new(ErrorCategory::Unavailable, e.to_string()),
                other => LlmError::new(ErrorCategory::Other, other.to_string()),
            })
    }

    fn name(&self) -> &str {
        "provider-chain"
    }

    fn model(&self) -> &str {
        self.providers
            .first()
            .map(|p| p.model())
            .unwrap_or("unknown")
    }

    async fn health_check(&self) -> bool {
        for provider in &self.providers {
            if provider.health_check().await {
                return true;
            }
        }
        false
    }
}
