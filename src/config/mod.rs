//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/docsmith/config.toml)
//! 3. Project config (.docsmith/config.toml)
//! 4. Provider environment variables (USE_OLLAMA, OPENAI_API_KEY, ...)
//! 5. Environment variables (DOCSMITH_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
