//! Translation Commands
//!
//! Usage:
//!   docsmith translate "<text>" --lang es
//!   docsmith translate-document doc.json --lang es [-o out.json]

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::ai::AiService;
use crate::cli::ui::Output;
use crate::cli::util::{read_json, write_json};
use crate::config::Config;
use crate::constants::languages;
use crate::document::{Document, DocumentTranslator};
use crate::types::Result;

fn warn_unsupported(lang: &str) {
    if !languages::is_supported(lang) {
        warn!("'{}' is not a known language code, passing it through as-is", lang);
    }
}

/// Translate a single piece of text or HTML
pub async fn text(config: &Config, text: &str, lang: &str) -> Result<()> {
    let output = Output::new();
    warn_unsupported(lang);

    let service = AiService::from_config(config)?;
    let translation = service.translate_text(text, lang).await?;

    output.attribution(&translation.attribution);
    println!("{}", translation.translated);
    Ok(())
}

/// Translate a saved document clause by clause
pub async fn document(
    config: &Config,
    file: &Path,
    lang: &str,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let output = Output::new();
    warn_unsupported(lang);

    let source: Document = read_json(file)?;
    let service = AiService::from_config(config)?;
    let delay = Duration::from_millis(config.documents.translation_delay_ms);

    let result = DocumentTranslator::new(&service, delay)
        .translate_document(&source, lang)
        .await?;

    write_json(&result.document, output_path.as_deref())?;

    // Keep stdout clean when the document itself went there
    if output_path.is_none() {
        return Ok(());
    }

    output.success(&format!(
        "Translated '{}' to {}",
        source.document_name,
        languages::display_name(lang)
    ));
    output.field("Translated", &result.translated.to_string());
    output.field("Empty", &result.skipped_empty.to_string());
    if result.kept_original > 0 {
        output.warning(&format!(
            "{} clause(s) kept their original text",
            result.kept_original
        ));
    }

    Ok(())
}
