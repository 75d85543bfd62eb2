//! AI Integration Layer
//!
//! Provider fallback, prompt construction, and response repair for
//! document generation and translation.

pub mod prompt;
pub mod provider;
pub mod service;
pub mod validation;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, looks_like_html};
pub use provider::{
    ChainAttemptResult, ChainStats, ChatMessage, CompletionRequest, CompletionResult,
    ErrorCategory, LlmError, LlmProvider, OllamaProvider, OpenAiProvider, OpenRouterProvider,
    ProviderChain, Role, SharedProvider,
};
pub use service::{
    AiService, Attribution, ClauseGeneration, ProviderSummary, SingleClauseGeneration,
    Translation,
};
pub use validation::{GeneratedClause, GeneratedClauseSet, JsonRepairer, parse_llm_json};
