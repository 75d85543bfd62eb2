//! Bulk Command
//!
//! One document per row of a JSON array.
//!
//! Usage:
//!   docsmith bulk rows.json --template offer.json [-o out/]
//!   docsmith bulk rows.json --type nda [-o out/]

use std::path::{Path, PathBuf};

use crate::ai::AiService;
use crate::cli::ui::Output;
use crate::cli::util::{read_json, write_json};
use crate::config::Config;
use crate::document::{BulkGenerator, BulkOutcome, Document, Template, rows_from_json};
use crate::types::Result;

/// Template file or AI document type
pub enum BulkSource {
    Template(PathBuf),
    Ai(String),
}

pub async fn run(
    config: &Config,
    rows_path: &Path,
    source: BulkSource,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let rows = rows_from_json(&read_json(rows_path)?)?;

    let outcome = match source {
        BulkSource::Template(path) => {
            let template: Template = read_json(&path)?;
            BulkOutcome {
                documents: BulkGenerator::from_template(&template, &rows)?,
                ..BulkOutcome::default()
            }
        }
        BulkSource::Ai(document_type) => {
            let service = AiService::from_config(config)?;
            BulkGenerator::new(&service)
                .from_ai(&document_type, &rows)
                .await?
        }
    };

    let Some(dir) = output_dir else {
        return write_json(&outcome, None);
    };

    let output = Output::new();
    for document in &outcome.documents {
        let path = dir.join(document_file_name(document));
        write_json(document, Some(&path))?;
    }

    output.success(&format!(
        "Generated {}/{} documents in {}",
        outcome.documents.len(),
        rows.len(),
        dir.display()
    ));
    if outcome.tokens_used > 0 {
        output.field("Tokens", &outcome.tokens_used.to_string());
    }
    for failure in &outcome.failures {
        output.error(&format!("Row {}: {}", failure.row, failure.message));
    }

    Ok(())
}

/// `{document_name}.json`, suffixed with the id prefix so repeated names
/// in one batch never overwrite each other
fn document_file_name(document: &Document) -> String {
    let id = document.id.simple().to_string();
    format!("{}_{}.json", document.document_name, &id[..8])
}
