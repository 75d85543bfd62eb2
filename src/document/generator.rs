//! Single-document generation: from a template, from the AI, or from
//! caller-supplied clauses.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::{Clause, Document, Template, filler};
use crate::ai::{AiService, Attribution};
use crate::types::{Context, Result, ValidationError};

/// A generated document plus who generated it
#[derive(Debug, Clone)]
pub struct AiDocument {
    pub document: Document,
    pub attribution: Attribution,
}

/// A template built from AI-generated clauses
#[derive(Debug, Clone, Serialize)]
pub struct AiTemplate {
    pub template: Template,
    #[serde(rename = "ai_metadata")]
    pub attribution: Attribution,
}

pub struct DocumentGenerator<'a> {
    ai: &'a AiService,
}

impl<'a> DocumentGenerator<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    /// Copy a template's clauses, filling placeholders when context is given
    pub fn from_template(template: &Template, context: &Context) -> Document {
        let clauses = if context.is_empty() {
            template.clauses.clone()
        } else {
            filler::fill_clauses(&template.clauses, context)
        };

        Document::new(
            format!("{}_{}", template.template_name, timestamp()),
            &template.document_type,
            clauses,
            context.clone(),
        )
        .with_template(template.id)
    }

    /// Save caller-supplied clauses as a document without generation
    pub fn direct(document_type: &str, clauses: Vec<Clause>, context: &Context) -> Document {
        Document::new(
            format!("{}_{}", document_type, timestamp()),
            document_type,
            clauses,
            context.clone(),
        )
    }

    /// Generate clauses with the AI, then fill them from the context
    pub async fn from_ai(&self, document_type: &str, context: &Context) -> Result<AiDocument> {
        let generation = self.ai.generate_clauses(document_type, context).await?;
        let clauses: Vec<Clause> = generation.clauses.into_iter().map(Clause::from).collect();

        let clauses = if context.is_empty() {
            clauses
        } else {
            filler::fill_clauses(&clauses, context)
        };

        info!(
            document_type,
            clauses = clauses.len(),
            tokens = generation.attribution.tokens_used,
            provider = %generation.attribution.provider,
            model = %generation.attribution.model,
            "AI document generated"
        );

        Ok(AiDocument {
            document: Document::new(
                format!("{}_AI_{}", document_type, timestamp()),
                document_type,
                clauses,
                context.clone(),
            ),
            attribution: generation.attribution,
        })
    }

    /// Build a reusable template from a generated clause set.
    ///
    /// The context only steers generation; `[Placeholder]` tokens are left
    /// in place so the template can be filled later.
    pub async fn template_from_ai(
        &self,
        template_name: &str,
        document_type: &str,
        context: &Context,
    ) -> Result<AiTemplate> {
        if template_name.trim().is_empty() {
            return Err(
                ValidationError::missing_field("template_name", "Template name is required").into(),
            );
        }

        let generation = self.ai.generate_clauses(document_type, context).await?;
        let clauses: Vec<Clause> = generation.clauses.into_iter().map(Clause::from).collect();

        let mut template = Template::new(template_name.trim(), document_type, clauses)
            .with_description("AI Generated");
        template.is_ai_generated = true;

        info!(
            template = %template.template_name,
            document_type,
            clauses = template.clauses.len(),
            tokens = generation.attribution.tokens_used,
            provider = %generation.attribution.provider,
            "AI template generated"
        );

        Ok(AiTemplate {
            template,
            attribution: generation.attribution,
        })
    }
}

fn timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::service::tests::{ScriptedProvider, service_with};

    fn offer_template() -> Template {
        Template::new(
            "Offer",
            "offer_letter",
            vec![Clause::new("greeting", "Dear [Candidate Name]")],
        )
    }

    #[test]
    fn test_from_template_fills() {
        let template = offer_template();
        let mut ctx = Context::new();
        ctx.insert("Candidate Name".to_string(), "Ada".to_string());

        let doc = DocumentGenerator::from_template(&template, &ctx);

        assert!(doc.document_name.starts_with("Offer_"));
        assert_eq!(doc.template_id, Some(template.id));
        assert_eq!(doc.clauses[0].content, "Dear Ada");
        assert_eq!(doc.variables["Candidate Name"], "Ada");
    }

    #[test]
    fn test_from_template_without_context_keeps_clauses() {
        let template = offer_template();
        let doc = DocumentGenerator::from_template(&template, &Context::new());
        assert_eq!(doc.clauses, template.clauses);
    }

    #[test]
    fn test_direct() {
        let doc = DocumentGenerator::direct("memo", vec![Clause::new("body", "x")], &Context::new());
        assert!(doc.document_name.starts_with("memo_"));
        assert!(doc.template_id.is_none());
    }

    #[tokio::test]
    async fn test_from_ai_fills_and_names() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"clauses":[{"clause_type":"greeting","content":"<p>Dear [Name]</p>","category":"nda"}]}"#,
        )]);
        let service = service_with(&provider);
        let mut ctx = Context::new();
        ctx.insert("Name".to_string(), "Grace".to_string());

        let result = DocumentGenerator::new(&service)
            .from_ai("nda", &ctx)
            .await
            .unwrap();

        assert!(result.document.document_name.starts_with("nda_AI_"));
        assert_eq!(result.document.clauses[0].content, "<p>Dear Grace</p>");
        assert_eq!(result.attribution.provider, "scripted");
    }

    #[tokio::test]
    async fn test_template_from_ai_keeps_placeholders() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"clauses":[
                {"clause_type":"parties","content":"<p>Between [Company] and [Name]</p>","category":"nda"},
                {"clause_type":"term","content":"<p>Two years</p>"}
            ]}"#,
        )]);
        let service = service_with(&provider);
        let mut ctx = Context::new();
        ctx.insert("Company".to_string(), "Acme".to_string());

        let result = DocumentGenerator::new(&service)
            .template_from_ai("Standard NDA", "nda", &ctx)
            .await
            .unwrap();

        let template = &result.template;
        assert_eq!(template.template_name, "Standard NDA");
        assert_eq!(template.document_type, "nda");
        assert!(template.is_ai_generated);
        assert_eq!(template.description.as_deref(), Some("AI Generated"));
        assert_eq!(template.clauses.len(), 2);
        assert_eq!(template.clauses[0].content, "<p>Between [Company] and [Name]</p>");
        assert_eq!(template.clauses[1].category, "general");
        assert_eq!(result.attribution.tokens_used, 10);

        // Context reaches the prompt but is not baked into the template
        let requests = provider.requests.lock().unwrap();
        assert!(requests[0].messages[1].content.contains("Acme"));
    }

    #[tokio::test]
    async fn test_template_from_ai_output_drives_bulk() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"clauses":[{"clause_type":"greeting","content":"Dear [Name]"}]}"#,
        )]);
        let service = service_with(&provider);

        let generated = DocumentGenerator::new(&service)
            .template_from_ai("Welcome", "offer_letter", &Context::new())
            .await
            .unwrap();
        let json = serde_json::to_string(&generated.template).unwrap();
        let template: Template = serde_json::from_str(&json).unwrap();

        let mut row = Context::new();
        row.insert("Name".to_string(), "Ada".to_string());
        let docs = crate::document::BulkGenerator::from_template(&template, &[row]).unwrap();

        assert_eq!(docs[0].clauses[0].content, "Dear Ada");
        assert_eq!(docs[0].template_id, Some(template.id));
    }

    #[tokio::test]
    async fn test_template_from_ai_requires_name() {
        let provider = ScriptedProvider::new(vec![]);
        let service = service_with(&provider);

        let err = DocumentGenerator::new(&service)
            .template_from_ai("  ", "nda", &Context::new())
            .await
            .unwrap_err();

        assert!(matches!(err, crate::types::DocError::Validation(_)));
        assert_eq!(provider.request_count(), 0);
    }
}
