//! docsmith - AI-Assisted Business Document Generator
//!
//! Generates offer letters, NDAs, contracts, invoices, and other business
//! documents from templates or from LLM output, and translates them clause
//! by clause.
//!
//! ## Core Features
//!
//! - **Provider Fallback**: ollama, then openrouter, then openai, tried in order
//! - **Model Fallback**: OpenRouter walks its model list on rate-limit or not-found
//! - **JSON Repair**: tolerant parsing of fenced or malformed model output
//! - **Documents**: placeholder filling, bulk generation, translation
//!
//! ## Quick Start
//!
//! ```ignore
//! use docsmith::{AiService, ConfigLoader, Context};
//!
//! let config = ConfigLoader::load()?;
//! let service = AiService::from_config(&config)?;
//! let generation = service.generate_clauses("nda", &Context::new()).await?;
//! println!("{} clauses from {}", generation.clauses.len(), generation.attribution.provider);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider adapters, fallback chain, prompts, response validation
//! - [`document`]: clauses, templates, generation, bulk, translation
//! - [`config`]: layered configuration
//! - [`types`]: error taxonomy and shared aliases

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{AiConfig, Config, ConfigLoader, ProviderKind, ProviderSettings};

// Error Types
pub use types::{Context, DocError, ErrorCategory, LlmError, Result};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AiService, Attribution, CompletionRequest, CompletionResult, LlmProvider, ProviderChain,
    SharedProvider,
};

// =============================================================================
// Document Re-exports
// =============================================================================

pub use document::{
    BulkGenerator, Clause, Document, DocumentGenerator, DocumentTranslator, Template,
};
