//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Built once at startup and shared read-only afterwards.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{document as doc_constants, ollama, openai, openrouter};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// AI provider settings
    pub ai: AiConfig,

    /// Document generation settings
    pub documents: DocumentsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            ai: AiConfig::default(),
            documents: DocumentsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for kind in ProviderKind::ALL {
            let settings = self.ai.settings(kind);

            if settings.timeout_secs == 0 {
                return Err(DocError::Config(format!(
                    "{} timeout_secs must be greater than 0",
                    kind
                )));
            }

            if settings.probe_timeout_secs == Some(0) {
                return Err(DocError::Config(format!(
                    "{} probe_timeout_secs must be greater than 0",
                    kind
                )));
            }

            if settings.enabled {
                validate_endpoint(kind, &settings.api_base)?;
            }
        }

        Ok(())
    }
}

fn validate_endpoint(kind: ProviderKind, endpoint: &str) -> Result<()> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        DocError::Config(format!("Invalid {} endpoint '{}': {}", kind, endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DocError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            kind,
            url.scheme()
        )));
    }

    Ok(())
}

// =============================================================================
// Provider Identity
// =============================================================================

/// The three provider slots, in fixed priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local inference runtime (free, slow)
    Ollama,
    /// Cloud model router fronting many models (cheap, fast)
    OpenRouter,
    /// Direct vendor API (expensive, fast)
    OpenAi,
}

impl ProviderKind {
    /// Priority order: cheapest first
    pub const ALL: [ProviderKind; 3] = [Self::Ollama, Self::OpenRouter, Self::OpenAi];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama => ollama::NAME,
            Self::OpenRouter => openrouter::NAME,
            Self::OpenAi => openai::NAME,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            _ => Err(format!(
                "Unknown provider: {}. Valid values: ollama, openrouter, openai",
                s
            )),
        }
    }
}

// =============================================================================
// AI Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub ollama: ProviderSettings,
    pub openrouter: ProviderSettings,
    pub openai: ProviderSettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            ollama: ProviderSettings {
                enabled: false,
                api_base: ollama::DEFAULT_HOST.to_string(),
                api_key: None,
                model: ollama::DEFAULT_MODEL.to_string(),
                fallback_models: Vec::new(),
                timeout_secs: ollama::DEFAULT_TIMEOUT_SECS,
                probe_timeout_secs: Some(ollama::PROBE_TIMEOUT_SECS),
            },
            openrouter: ProviderSettings {
                enabled: false,
                api_base: openrouter::DEFAULT_API_BASE.to_string(),
                api_key: None,
                model: openrouter::DEFAULT_MODEL.to_string(),
                fallback_models: openrouter::DEFAULT_FALLBACK_MODELS
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                timeout_secs: openrouter::DEFAULT_TIMEOUT_SECS,
                probe_timeout_secs: None,
            },
            openai: ProviderSettings {
                enabled: false,
                api_base: openai::DEFAULT_API_BASE.to_string(),
                api_key: None,
                model: openai::DEFAULT_MODEL.to_string(),
                fallback_models: Vec::new(),
                timeout_secs: openai::DEFAULT_TIMEOUT_SECS,
                probe_timeout_secs: None,
            },
        }
    }
}

impl AiConfig {
    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Ollama => &self.ollama,
            ProviderKind::OpenRouter => &self.openrouter,
            ProviderKind::OpenAi => &self.openai,
        }
    }

    /// Whether a provider is both enabled and usable.
    ///
    /// The local model needs a host; remote providers need a credential.
    pub fn is_active(&self, kind: ProviderKind) -> bool {
        let settings = self.settings(kind);
        if !settings.enabled {
            return false;
        }
        match kind {
            ProviderKind::Ollama => !settings.api_base.trim().is_empty(),
            ProviderKind::OpenRouter | ProviderKind::OpenAi => settings
                .api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty()),
        }
    }

    /// Active providers in fixed priority order
    pub fn active_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.is_active(*kind))
            .collect()
    }

    pub fn has_any_provider(&self) -> bool {
        !self.active_providers().is_empty()
    }
}

/// Settings for a single provider slot
///
/// API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Whether this provider takes part in the fallback chain
    pub enabled: bool,
    /// Endpoint base URL (host for the local model)
    pub api_base: String,
    /// API credential (remote providers only)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Primary model identifier
    pub model: String,
    /// Models tried in order after the primary (cloud router only)
    #[serde(default, deserialize_with = "string_or_list")]
    pub fallback_models: Vec<String>,
    /// Generation request timeout in seconds
    pub timeout_secs: u64,
    /// Reachability probe timeout in seconds (local model only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("enabled", &self.enabled)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("fallback_models", &self.fallback_models)
            .field("timeout_secs", &self.timeout_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .finish()
    }
}

impl ProviderSettings {
    /// Primary model followed by fallbacks, without duplicates
    pub fn model_chain(&self) -> Vec<String> {
        let mut models = vec![self.model.clone()];
        for model in &self.fallback_models {
            if !models.contains(model) {
                models.push(model.clone());
            }
        }
        models
    }
}

/// Accepts either a TOML/JSON list or a comma-separated string
/// (`OPENROUTER_FALLBACK_MODELS=a,b,c`).
fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::List(list) => list,
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// =============================================================================
// Documents Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Pause between clause translations, in milliseconds
    pub translation_delay_ms: u64,

    /// Category applied to generated clauses that omit one
    pub default_category: String,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            translation_delay_ms: doc_constants::TRANSLATION_DELAY_MS,
            default_category: doc_constants::DEFAULT_CATEGORY.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_all() -> AiConfig {
        let mut ai = AiConfig::default();
        ai.ollama.enabled = true;
        ai.openrouter.enabled = true;
        ai.openrouter.api_key = Some("or-key".to_string());
        ai.openai.enabled = true;
        ai.openai.api_key = Some("oa-key".to_string());
        ai
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert!(config.ai.active_providers().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_active_providers_fixed_order() {
        let ai = enabled_all();
        assert_eq!(
            ai.active_providers(),
            vec![
                ProviderKind::Ollama,
                ProviderKind::OpenRouter,
                ProviderKind::OpenAi
            ]
        );
    }

    #[test]
    fn test_remote_provider_requires_key() {
        let mut ai = enabled_all();
        ai.openrouter.api_key = None;
        ai.openai.api_key = Some("   ".to_string());
        assert_eq!(ai.active_providers(), vec![ProviderKind::Ollama]);
    }

    #[test]
    fn test_disabled_provider_skipped() {
        let mut ai = enabled_all();
        ai.ollama.enabled = false;
        assert_eq!(
            ai.active_providers(),
            vec![ProviderKind::OpenRouter, ProviderKind::OpenAi]
        );
    }

    #[test]
    fn test_model_chain_dedups() {
        let mut settings = AiConfig::default().openrouter;
        settings.model = "a".to_string();
        settings.fallback_models = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(settings.model_chain(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fallback_models_from_comma_string() {
        let json = serde_json::json!({
            "enabled": true,
            "api_base": "https://example.com",
            "model": "m",
            "fallback_models": "x/one, y/two,,z/three",
            "timeout_secs": 10
        });
        let settings: ProviderSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.fallback_models, vec!["x/one", "y/two", "z/three"]);
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let ai = enabled_all();
        let debug = format!("{:?}", ai.openai);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("oa-key"));

        let serialized = serde_json::to_string(&ai).unwrap();
        assert!(!serialized.contains("oa-key"));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut config = Config::default();
        config.ai.ollama.enabled = true;
        config.ai.ollama.api_base = "ftp://localhost".to_string();
        assert!(matches!(config.validate(), Err(DocError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.ai.openai.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenRouter".parse::<ProviderKind>().unwrap(), ProviderKind::OpenRouter);
        assert!("claude".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }
}
