//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docsmith/config.toml)
//! 3. Project config (.docsmith/config.toml)
//! 4. Well-known provider variables (USE_OLLAMA, OPENROUTER_API_KEY, ...)
//! 5. Environment variables (DOCSMITH_* prefix, `__` separates sections)
//!
//! The result is validated once and never re-read by provider code.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocError, Result};

/// Conventional provider variables and the config keys they populate
const PROVIDER_ENV_VARS: &[(&str, &str)] = &[
    ("USE_OLLAMA", "ai.ollama.enabled"),
    ("OLLAMA_HOST", "ai.ollama.api_base"),
    ("OLLAMA_MODEL", "ai.ollama.model"),
    ("USE_OPENROUTER", "ai.openrouter.enabled"),
    ("OPENROUTER_API_KEY", "ai.openrouter.api_key"),
    ("OPENROUTER_MODEL", "ai.openrouter.model"),
    ("OPENROUTER_FALLBACK_MODELS", "ai.openrouter.fallback_models"),
    ("USE_OPENAI", "ai.openai.enabled"),
    ("OPENAI_API_KEY", "ai.openai.api_key"),
    ("OPENAI_MODEL", "ai.openai.model"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → provider vars → DOCSMITH_* vars
    pub fn load() -> Result<Config> {
        Self::extract(Self::figment())
    }

    /// Load with an explicit file in place of the global and project files.
    /// Environment layers still apply on top.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::extract(Self::figment_with_file(path))
    }

    /// Assemble the layered figment without extracting it
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::with_env_layers(figment)
    }

    /// Defaults, one explicit file, then the environment layers
    pub fn figment_with_file(path: &Path) -> Figment {
        debug!("Loading config from: {}", path.display());
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));

        Self::with_env_layers(figment)
    }

    fn with_env_layers(figment: Figment) -> Figment {
        figment
            .merge(Self::provider_env())
            .merge(Env::prefixed("DOCSMITH_").split("__").lowercase(true))
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        debug!(
            providers = ?config.ai.active_providers(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Map conventional provider variables onto config keys
    fn provider_env() -> Env {
        let names: Vec<&str> = PROVIDER_ENV_VARS.iter().map(|(name, _)| *name).collect();

        Env::raw().only(&names).map(|key| {
            PROVIDER_ENV_VARS
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| Uncased::from(*path))
                .unwrap_or_else(|| Uncased::from(key.as_str()))
        })
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docsmith/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docsmith"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".docsmith")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration (API keys are never printed)
    pub fn show_config(as_json: bool, path: Option<&Path>) -> Result<()> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| DocError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DocError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_template())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = Self::project_config_path();
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_template())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    /// Default config file content (TOML). Credentials belong in the environment.
    fn default_config_template() -> String {
        r#"# docsmith configuration
# Providers are tried in fixed order: ollama -> openrouter -> openai.
# Set credentials via OPENROUTER_API_KEY / OPENAI_API_KEY.

version = "1.0"

[ai.ollama]
enabled = false
api_base = "http://localhost:11434"
model = "llama3.2:3b"
timeout_secs = 60
probe_timeout_secs = 3

[ai.openrouter]
enabled = false
api_base = "https://openrouter.ai/api/v1"
model = "meta-llama/llama-3.1-8b-instruct"
fallback_models = [
    "google/gemini-flash-1.5",
    "qwen/qwen-2-7b-instruct",
    "mistralai/mistral-7b-instruct",
]
timeout_secs = 30

[ai.openai]
enabled = false
api_base = "https://api.openai.com/v1"
model = "gpt-3.5-turbo"
timeout_secs = 30

[documents]
translation_delay_ms = 500
default_category = "general"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use figment::Jail;

    #[test]
    fn test_load_default_config() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", &dir);
            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.version, "1.0");
            Ok(())
        });
    }

    #[test]
    fn test_provider_env_vars() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", &dir);
            jail.set_env("USE_OPENROUTER", "true");
            jail.set_env("OPENROUTER_API_KEY", "sk-or-test");
            jail.set_env("OPENROUTER_FALLBACK_MODELS", "a/one,b/two");
            jail.set_env("USE_OLLAMA", "false");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.ai.openrouter.api_key.as_deref(), Some("sk-or-test"));
            assert_eq!(config.ai.openrouter.fallback_models, vec!["a/one", "b/two"]);
            assert_eq!(config.ai.active_providers(), vec![ProviderKind::OpenRouter]);
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_override() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", &dir);
            jail.set_env("OPENAI_MODEL", "gpt-from-legacy");
            jail.set_env("DOCSMITH_AI__OPENAI__MODEL", "gpt-from-prefixed");
            jail.set_env("DOCSMITH_DOCUMENTS__TRANSLATION_DELAY_MS", "0");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.ai.openai.model, "gpt-from-prefixed");
            assert_eq!(config.documents.translation_delay_ms, 0);
            Ok(())
        });
    }

    #[test]
    fn test_project_file_layer() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", &dir);
            jail.create_dir(".docsmith")?;
            jail.create_file(
                ".docsmith/config.toml",
                r#"
                [ai.ollama]
                enabled = true
                model = "mistral:7b"
                "#,
            )?;

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert!(config.ai.ollama.enabled);
            assert_eq!(config.ai.ollama.model, "mistral:7b");
            // Untouched fields keep their defaults
            assert_eq!(config.ai.ollama.timeout_secs, 60);
            assert_eq!(config.ai.active_providers(), vec![ProviderKind::Ollama]);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_file_template_roundtrip() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", &ConfigLoader::default_config_template())?;

            let config =
                ConfigLoader::load_from_file(Path::new("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.ai.openrouter.fallback_models.len(), 3);
            assert_eq!(config.ai.ollama.probe_timeout_secs, Some(3));
            assert!(config.ai.active_providers().is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_keeps_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [ai.openrouter]
                enabled = true
                model = "file/model"

                [documents]
                translation_delay_ms = 100
                "#,
            )?;
            jail.set_env("OPENROUTER_API_KEY", "sk-or-env");
            jail.set_env("DOCSMITH_DOCUMENTS__TRANSLATION_DELAY_MS", "0");

            let config =
                ConfigLoader::load_from_file(Path::new("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.ai.openrouter.api_key.as_deref(), Some("sk-or-env"));
            assert_eq!(config.ai.openrouter.model, "file/model");
            assert_eq!(config.documents.translation_delay_ms, 0);
            assert_eq!(config.ai.active_providers(), vec![ProviderKind::OpenRouter]);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_replaces_project_file() {
        Jail::expect_with(|jail| {
            let dir = jail.directory().display().to_string();
            jail.set_env("XDG_CONFIG_HOME", &dir);
            jail.create_dir(".docsmith")?;
            jail.create_file(".docsmith/config.toml", "[ai.ollama]\nmodel = \"project\"\n")?;
            jail.create_file("custom.toml", "[ai.openai]\nmodel = \"custom\"\n")?;

            let config =
                ConfigLoader::load_from_file(Path::new("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.ai.openai.model, "custom");
            assert_ne!(config.ai.ollama.model, "project");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[ai.openai]\ntimeout_secs = 0\n")?;

            let err = ConfigLoader::load_from_file(Path::new("custom.toml")).unwrap_err();
            assert!(err.is_configuration());
            Ok(())
        });
    }
}
