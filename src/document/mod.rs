//! Document Layer
//!
//! Clauses, templates, and documents, plus the operations that produce them:
//! placeholder filling, single and bulk generation, and clause-by-clause
//! translation. Persistence is left to callers; everything here is in-memory
//! and serializable.

pub mod bulk;
pub mod filler;
pub mod generator;
pub mod translate;

pub use bulk::{BulkGenerator, BulkOutcome, RowFailure, rows_from_json};
pub use filler::{extract_placeholders, fill_clause, fill_clauses, template_placeholders};
pub use generator::{AiDocument, AiTemplate, DocumentGenerator};
pub use translate::{DocumentTranslator, TranslatedDocument, strip_tags};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::GeneratedClause;
use crate::types::Context;

/// One section of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub clause_type: String,
    /// Plain or HTML text with `[Placeholder]` tokens
    #[serde(default)]
    pub content: String,
    /// Rendered HTML, when it differs from `content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    crate::constants::document::DEFAULT_CATEGORY.to_string()
}

impl Clause {
    pub fn new(clause_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            clause_type: clause_type.into(),
            content: content.into(),
            content_html: None,
            category: default_category(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// HTML if present, otherwise the plain content
    pub fn display_content(&self) -> &str {
        self.content_html.as_deref().unwrap_or(&self.content)
    }
}

impl From<GeneratedClause> for Clause {
    fn from(generated: GeneratedClause) -> Self {
        Self {
            clause_type: generated.clause_type,
            content: generated.content,
            content_html: None,
            category: generated.category,
        }
    }
}

/// Reusable clause list for one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub template_name: String,
    pub document_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_ai_generated: bool,
    #[serde(default)]
    pub clauses: Vec<Clause>,
}

impl Template {
    pub fn new(
        template_name: impl Into<String>,
        document_type: impl Into<String>,
        clauses: Vec<Clause>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_name: template_name.into(),
            document_type: document_type.into(),
            description: None,
            is_ai_generated: false,
            clauses,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A generated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<Uuid>,
    pub document_name: String,
    pub document_type: String,
    pub clauses: Vec<Clause>,
    /// Values used to fill placeholders
    #[serde(default)]
    pub variables: Context,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        document_name: impl Into<String>,
        document_type: impl Into<String>,
        clauses: Vec<Clause>,
        variables: Context,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: None,
            document_name: document_name.into(),
            document_type: document_type.into(),
            clauses,
            variables,
            created_at: Utc::now(),
        }
    }

    pub fn with_template(mut self, template_id: Uuid) -> Self {
        self.template_id = Some(template_id);
        self
    }

    /// All clause bodies joined by blank lines
    pub fn combined_content(&self) -> String {
        self.clauses
            .iter()
            .map(Clause::display_content)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_defaults_on_deserialize() {
        let clause: Clause = serde_json::from_str(r#"{"clause_type": "header"}"#).unwrap();
        assert_eq!(clause.content, "");
        assert_eq!(clause.category, "general");
        assert!(clause.content_html.is_none());
    }

    #[test]
    fn test_display_content_prefers_html() {
        let mut clause = Clause::new("p", "plain");
        assert_eq!(clause.display_content(), "plain");
        clause.content_html = Some("<p>plain</p>".to_string());
        assert_eq!(clause.display_content(), "<p>plain</p>");
    }

    #[test]
    fn test_combined_content() {
        let doc = Document::new(
            "doc",
            "memo",
            vec![Clause::new("a", "one"), Clause::new("b", "two")],
            Context::new(),
        );
        assert_eq!(doc.combined_content(), "one\n\ntwo");
    }

    #[test]
    fn test_template_id_generated_when_missing() {
        let template: Template = serde_json::from_str(
            r#"{"template_name": "Offer", "document_type": "offer_letter", "clauses": []}"#,
        )
        .unwrap();
        assert!(!template.id.is_nil());
        assert!(!template.is_ai_generated);
        assert!(template.description.is_none());
    }

    #[test]
    fn test_from_generated_clause() {
        let clause = Clause::from(GeneratedClause {
            clause_type: "term".to_string(),
            content: "<p>x</p>".to_string(),
            category: "nda".to_string(),
        });
        assert_eq!(clause.category, "nda");
        assert!(clause.content_html.is_none());
    }
}
