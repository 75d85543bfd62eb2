//! Generation Commands
//!
//! Usage:
//!   docsmith complete "<prompt>" [--system "..."] [--temperature 0.7]
//!   docsmith clauses <document-type> [-c KEY=VALUE]... [-o out.json]
//!   docsmith clause <clause-type> [--category nda] [-c KEY=VALUE]...
//!   docsmith template <name> --type <document-type> [-c KEY=VALUE]... [-o t.json]
//!   docsmith generate <document-type> [--template t.json | --clauses c.json] [-c KEY=VALUE]...

use std::path::PathBuf;

use tracing::warn;

use crate::ai::{AiService, Attribution, ChatMessage};
use crate::cli::ui::Output;
use crate::cli::util::{read_json, write_json};
use crate::config::Config;
use crate::constants::document_types;
use crate::document::{Clause, DocumentGenerator, Template};
use crate::types::{Context, Result};

/// Raw completion through the fallback chain
pub async fn complete(
    config: &Config,
    prompt: &str,
    system: Option<&str>,
    temperature: f32,
) -> Result<()> {
    let service = AiService::from_config(config)?;

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    let result = service.complete(messages, temperature).await?;

    Output::new().attribution(&Attribution::from(&result));
    println!("{}", result.content);
    Ok(())
}

/// Generate a validated clause set for a document type
pub async fn clauses(
    config: &Config,
    document_type: &str,
    context: &Context,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = AiService::from_config(config)?;
    let generation = service.generate_clauses(document_type, context).await?;

    let out = Output::new();
    out.attribution(&generation.attribution);
    if output.is_some() {
        out.success(&format!(
            "Generated {} clauses for {}",
            generation.clauses.len(),
            document_types::label(document_type).unwrap_or(document_type)
        ));
    }

    write_json(&generation, output.as_deref())
}

/// Generate one clause
pub async fn clause(
    config: &Config,
    clause_type: &str,
    category: &str,
    context: &Context,
) -> Result<()> {
    let service = AiService::from_config(config)?;
    let generation = service
        .generate_single_clause(clause_type, category, context)
        .await?;

    Output::new().attribution(&generation.attribution);
    write_json(&generation, None)
}

/// Generate a reusable template; the written JSON feeds `generate --template`
/// and `bulk --template`
pub async fn template(
    config: &Config,
    template_name: &str,
    document_type: &str,
    context: &Context,
    output: Option<PathBuf>,
) -> Result<()> {
    let service = AiService::from_config(config)?;
    let generated = DocumentGenerator::new(&service)
        .template_from_ai(template_name, document_type, context)
        .await?;

    let out = Output::new();
    out.attribution(&generated.attribution);
    if output.is_some() {
        out.success(&format!(
            "Created template '{}' ({} clauses)",
            generated.template.template_name,
            generated.template.clauses.len()
        ));
    }

    write_json(&generated.template, output.as_deref())
}

/// Where the clauses of a generated document come from
pub enum GenerateSource {
    Template(PathBuf),
    Clauses(PathBuf),
    Ai,
}

/// Produce a document from a template, supplied clauses, or the AI
pub async fn document(
    config: &Config,
    document_type: &str,
    source: GenerateSource,
    context: &Context,
    output: Option<PathBuf>,
) -> Result<()> {
    let out = Output::new();

    let document = match source {
        GenerateSource::Template(path) => {
            let template: Template = read_json(&path)?;
            if template.document_type != document_type {
                warn!(
                    "Template is for '{}', not '{}'",
                    template.document_type, document_type
                );
            }
            DocumentGenerator::from_template(&template, context)
        }
        GenerateSource::Clauses(path) => {
            let clauses: Vec<Clause> = read_json(&path)?;
            DocumentGenerator::direct(document_type, clauses, context)
        }
        GenerateSource::Ai => {
            let service = AiService::from_config(config)?;
            let generated = DocumentGenerator::new(&service)
                .from_ai(document_type, context)
                .await?;
            out.attribution(&generated.attribution);
            generated.document
        }
    };

    if output.is_some() {
        out.success(&format!(
            "Created '{}' ({} clauses)",
            document.document_name,
            document.clauses.len()
        ));
    }

    write_json(&document, output.as_deref())
}
