//! Document Translation
//!
//! Translates a document clause by clause, one call at a time with a fixed
//! pause between calls. A clause that fails to translate keeps its original
//! text; the batch never aborts.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use super::{Clause, Document};
use crate::ai::AiService;
use crate::types::Result;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Remove HTML tags, keeping text content
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// A translated copy of a document with per-clause counts
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedDocument {
    pub document: Document,
    pub translated: usize,
    pub kept_original: usize,
    pub skipped_empty: usize,
}

pub struct DocumentTranslator<'a> {
    ai: &'a AiService,
    delay: Duration,
}

impl<'a> DocumentTranslator<'a> {
    pub fn new(ai: &'a AiService, delay: Duration) -> Self {
        Self { ai, delay }
    }

    /// Translate every clause into `target_lang`, producing a new document
    /// named `{name}_{lang}`.
    ///
    /// A clause that fails keeps its original text; a configuration error
    /// aborts the translation.
    pub async fn translate_document(
        &self,
        document: &Document,
        target_lang: &str,
    ) -> Result<TranslatedDocument> {
        info!(
            "Translating '{}' ({} clauses) to {}",
            document.document_name,
            document.clauses.len(),
            target_lang
        );

        let mut clauses = Vec::with_capacity(document.clauses.len());
        let mut translated = 0;
        let mut kept_original = 0;
        let mut skipped_empty = 0;
        let mut calls_made = 0usize;

        for (index, clause) in document.clauses.iter().enumerate() {
            let original = clause.display_content();

            if original.trim().is_empty() {
                clauses.push(Clause {
                    content: String::new(),
                    content_html: Some(String::new()),
                    ..clause.clone()
                });
                skipped_empty += 1;
                continue;
            }

            if calls_made > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            calls_made += 1;

            info!(
                "  {}/{} Translating {}",
                index + 1,
                document.clauses.len(),
                clause.clause_type
            );

            match self.ai.translate_text(original, target_lang).await {
                Ok(result) => {
                    clauses.push(Clause {
                        content: strip_tags(&result.translated),
                        content_html: Some(result.translated),
                        ..clause.clone()
                    });
                    translated += 1;
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    warn!(
                        "Translation failed for clause {} ({}), keeping original: {}",
                        index + 1,
                        clause.clause_type,
                        e
                    );
                    clauses.push(clause.clone());
                    kept_original += 1;
                }
            }
        }

        let mut translated_doc = Document::new(
            format!("{}_{}", document.document_name, target_lang),
            &document.document_type,
            clauses,
            document.variables.clone(),
        );
        translated_doc.template_id = document.template_id;

        info!(
            translated,
            kept_original,
            skipped_empty,
            "Translated document '{}' created",
            translated_doc.document_name
        );

        Ok(TranslatedDocument {
            document: translated_doc,
            translated,
            kept_original,
            skipped_empty,
        })
    }
}
