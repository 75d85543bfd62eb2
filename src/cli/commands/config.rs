//! Config Command
//!
//! Manage docsmith configuration.
//!
//! Usage:
//!   docsmith config show [--json] [--config FILE]
//!   docsmith config path
//!   docsmith config init [-g] [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{DocError, Result};

/// Show merged effective configuration, optionally rooted at an explicit file
pub fn show(as_json: bool, config_path: Option<&Path>) -> Result<()> {
    if let Some(path) = config_path
        && !path.exists()
    {
        return Err(DocError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    ConfigLoader::show_config(as_json, config_path)
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a starter config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let output = Output::new();

    if global {
        let dir = ConfigLoader::init_global(force)?;
        output.success("Initialized global configuration");
        output.field("Directory", &dir.display().to_string());
        if let Some(config_path) = ConfigLoader::global_config_path() {
            output.field("Config", &config_path.display().to_string());
        }
    } else {
        let dir = ConfigLoader::init_project(force)?;
        output.success("Initialized project configuration");
        output.field("Directory", &dir.display().to_string());
        output.field(
            "Config",
            &ConfigLoader::project_config_path().display().to_string(),
        );
    }

    output.info("Credentials are read from OPENROUTER_API_KEY and OPENAI_API_KEY");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_show_uses_explicit_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[ai.openai]\nmodel = \"custom\"\n")?;
            show(true, Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            Ok(())
        });
    }

    #[test]
    fn test_show_rejects_missing_explicit_file() {
        let err = show(false, Some(Path::new("/nonexistent/docsmith.toml"))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_show_rejects_invalid_explicit_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[ai.ollama]\ntimeout_secs = 0\n")?;
            let err = show(false, Some(Path::new("custom.toml"))).unwrap_err();
            assert!(err.is_configuration());
            Ok(())
        });
    }
}
