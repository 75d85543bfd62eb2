//! AI Service
//!
//! High-level generation operations on top of the provider chain: prompt
//! construction, the completion call, then parsing and shape validation.
//! Every result carries the provider and model that actually answered.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, instrument};

use super::prompt::{self, PromptTemplates};
use super::provider::{ChatMessage, CompletionRequest, CompletionResult, ProviderChain};
use super::validation::{self, GeneratedClause};
use crate::config::{AiConfig, Config, ProviderKind};
use crate::constants::temperature;
use crate::types::{Context, Result};

/// Which provider and model produced a result, and what it cost in tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub tokens_used: u32,
    pub model: String,
    pub provider: String,
}

impl From<&CompletionResult> for Attribution {
    fn from(result: &CompletionResult) -> Self {
        Self {
            tokens_used: result.tokens_used,
            model: result.model.clone(),
            provider: result.provider.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClauseGeneration {
    pub clauses: Vec<GeneratedClause>,
    #[serde(flatten)]
    pub attribution: Attribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct SingleClauseGeneration {
    pub clause: GeneratedClause,
    #[serde(flatten)]
    pub attribution: Attribution,
}

#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    pub translated: String,
    pub is_html: bool,
    #[serde(flatten)]
    pub attribution: Attribution,
}

/// Active providers and configured models
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub providers: Vec<String>,
    /// First active provider, `none` when nothing is configured
    pub primary: String,
    pub models: BTreeMap<String, String>,
    pub output_format: &'static str,
}

/// Entry point for every AI-backed operation
#[derive(Clone)]
pub struct AiService {
    chain: ProviderChain,
    ai: AiConfig,
    default_category: String,
}

impl AiService {
    /// Build the service and its provider chain from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let chain = ProviderChain::from_config(&config.ai)?;
        Ok(Self::with_chain(
            chain,
            config.ai.clone(),
            &config.documents.default_category,
        ))
    }

    /// Use an already-built chain
    pub fn with_chain(chain: ProviderChain, ai: AiConfig, default_category: &str) -> Self {
        Self {
            chain,
            ai,
            default_category: default_category.to_string(),
        }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Raw completion through the fallback chain
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<CompletionResult> {
        self.chain
            .complete(&CompletionRequest::new(messages, temperature))
            .await
    }

    /// Generate a full, validated clause set for a document type
    #[instrument(skip(self, context))]
    pub async fn generate_clauses(
        &self,
        document_type: &str,
        context: &Context,
    ) -> Result<ClauseGeneration> {
        let request = CompletionRequest::system_user(
            prompt::system::CLAUSE_SET,
            PromptTemplates::clause_set(document_type, context),
            temperature::GENERATION,
        );

        let result = self.chain.complete(&request).await?;
        let set = validation::parse_clause_set(&result.content, &self.default_category)?;

        info!(
            "Generated {} clauses using {}/{}",
            set.len(),
            result.provider,
            result.model
        );

        Ok(ClauseGeneration {
            clauses: set.clauses,
            attribution: Attribution::from(&result),
        })
    }

    /// Generate one clause of a given type
    #[instrument(skip(self, context))]
    pub async fn generate_single_clause(
        &self,
        clause_type: &str,
        category: &str,
        context: &Context,
    ) -> Result<SingleClauseGeneration> {
        let request = CompletionRequest::system_user(
            prompt::system::SINGLE_CLAUSE,
            PromptTemplates::single_clause(clause_type, category, context),
            temperature::GENERATION,
        );

        let result = self.chain.complete(&request).await?;
        let clause = validation::parse_single_clause(&result.content, clause_type, category)?;

        info!(
            "Generated single clause [{}] using {}",
            clause_type, result.provider
        );

        Ok(SingleClauseGeneration {
            clause,
            attribution: Attribution::from(&result),
        })
    }

    /// Translate text, keeping HTML tags when the input looks like HTML
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn translate_text(&self, text: &str, target_lang: &str) -> Result<Translation> {
        let is_html = prompt::looks_like_html(text);
        let system = if is_html {
            prompt::system::TRANSLATE_HTML
        } else {
            prompt::system::TRANSLATE_TEXT
        };

        let request = CompletionRequest::system_user(
            system,
            PromptTemplates::translation(text, target_lang, is_html),
            temperature::TRANSLATION,
        );

        let result = self.chain.complete(&request).await?;

        info!(
            "Translated ({} -> {} chars) using {}",
            text.len(),
            result.content.len(),
            result.provider
        );

        Ok(Translation {
            translated: result.content.trim().to_string(),
            is_html,
            attribution: Attribution::from(&result),
        })
    }

    /// Active providers in priority order plus the configured models
    pub fn summary(&self) -> ProviderSummary {
        let providers: Vec<String> = self
            .ai
            .active_providers()
            .into_iter()
            .map(|kind| kind.name().to_string())
            .collect();

        let models = ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind.name().to_string(), self.ai.settings(kind).model.clone()))
            .collect();

        ProviderSummary {
            primary: providers
                .first()
                .cloned()
                .unwrap_or_else(|| "none".to_string()),
            providers,
            models,
            output_format: "HTML",
        }
    }
}
