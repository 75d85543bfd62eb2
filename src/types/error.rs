//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Categories
//!
//! Provider failures are tagged with an [`ErrorCategory`] at the point they are
//! raised (HTTP status, vendor error code, probe result). Fallback decisions
//! read the tag; they never re-inspect the message text.
//!
//! - **RateLimit**: provider throttled the request (try next model)
//! - **NotFound**: model unknown to the provider (try next model, fix config)
//! - **Unavailable**: provider disabled or unreachable (try next provider)
//! - **Other**: auth, transport, server errors (stop within the adapter)

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Failure categories used for fallback routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Requested model does not exist on the provider
    NotFound,
    /// Provider disabled or unreachable
    Unavailable,
    /// Anything else (auth, transport, malformed response, 5xx)
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

impl ErrorCategory {
    /// Whether a multi-model adapter should move on to its next model
    pub fn is_model_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::NotFound)
    }

    /// Classify an HTTP status code (or vendor-reported numeric error code)
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            404 => Self::NotFound,
            _ => Self::Other,
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Structured provider error with category and attribution
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Model being requested when the error occurred
    pub model: Option<String>,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.provider, &self.model) {
            (Some(provider), Some(model)) => {
                write!(f, "[{}/{}:{}] {}", provider, model, self.category, self.message)
            }
            (Some(provider), None) => write!(f, "[{}:{}] {}", provider, self.category, self.message),
            _ => write!(f, "[{}] {}", self.category, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Create a new LLM error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            model: None,
            status: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self::new(category, message).provider(provider)
    }

    /// Error from a non-success HTTP response
    pub fn from_http_status(status: u16, body: &str, provider: impl Into<String>) -> Self {
        let mut err = Self::with_provider(
            ErrorCategory::from_status(status),
            format!("HTTP {}: {}", status, body),
            provider,
        );
        err.status = Some(status);
        err
    }

    /// Add provider context to existing error
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add model context to existing error
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn is_model_retryable(&self) -> bool {
        self.category.is_model_retryable()
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// What validation failed
    pub kind: ValidationErrorKind,
    /// Field or component that failed validation
    pub field: Option<String>,
    /// Detailed message
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Validation failed for '{}': {}", field, self.message)
        } else {
            write!(f, "Validation failed: {}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
        }
    }

    /// Add field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn missing_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingField, message).with_field(field)
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required field missing or blank
    MissingField,
    /// Collection present but empty
    Empty,
    /// Input rows do not match the template
    Columns,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    /// No provider is enabled and credentialed. Never retried.
    #[error(
        "No AI providers configured. Enable ollama, openrouter, or openai (USE_OLLAMA / USE_OPENROUTER / USE_OPENAI)"
    )]
    NoProviders,

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Every configured provider failed
    #[error("All AI providers failed after {attempts} attempt(s). Last error: {last_error}")]
    ProvidersExhausted { attempts: usize, last_error: String },

    // -------------------------------------------------------------------------
    // Malformed Output
    // -------------------------------------------------------------------------
    #[error("AI response contains no valid JSON object")]
    NoJsonObject,

    #[error("Invalid JSON from AI provider: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    Validation(ValidationError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Bulk input error: {0}")]
    Bulk(String),
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

impl From<ValidationError> for DocError {
    fn from(err: ValidationError) -> Self {
        DocError::Validation(err)
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    /// Whether this error means the deployment is misconfigured
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoProviders | Self::Config(_))
    }

    /// Whether the provider answered but the output was unusable
    pub fn is_malformed_output(&self) -> bool {
        matches!(
            self,
            Self::NoJsonObject | Self::InvalidJson(_) | Self::Validation(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
