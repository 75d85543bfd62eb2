//! CLI Common Utilities
//!
//! Config resolution, `KEY=VALUE` context parsing, and JSON file I/O shared
//! by the command handlers.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{Config, ConfigLoader};
use crate::types::{Context, DocError, Result};

/// Load configuration from an explicit file, or the layered defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(DocError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            ConfigLoader::load_from_file(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Clap value parser for `-c "Candidate Name=Ada Lovelace"`
pub fn parse_context_pair(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid context '{}'. Expected KEY=VALUE", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid context '{}'. Key must not be empty", s));
    }

    Ok((key.to_string(), value.to_string()))
}

/// Collect parsed pairs into a context; later keys win
pub fn context_from_pairs(pairs: Vec<(String, String)>) -> Context {
    pairs.into_iter().collect()
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Pretty-print JSON to a file, or stdout when no path is given
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_context_pair() {
        assert_eq!(
            parse_context_pair("Candidate Name=Ada=L").unwrap(),
            ("Candidate Name".to_string(), "Ada=L".to_string())
        );
        assert_eq!(
            parse_context_pair(" Salary =").unwrap(),
            ("Salary".to_string(), String::new())
        );
        assert!(parse_context_pair("novalue").is_err());
        assert!(parse_context_pair("=x").is_err());
    }

    #[test]
    fn test_context_from_pairs_last_wins() {
        let ctx = context_from_pairs(vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
        ]);
        assert_eq!(ctx["a"], "2");
    }

    #[test]
    fn test_write_then_read_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");

        write_json(&serde_json::json!({"k": "v"}), Some(&path)).unwrap();
        let value: serde_json::Value = read_json(&path).unwrap();

        assert_eq!(value["k"], "v");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/docsmith.toml"))).unwrap_err();
        assert!(err.is_configuration());
    }
}
