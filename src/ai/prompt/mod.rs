//! Prompt Builder System
//!
//! Standardized prompt construction for document generation and translation.
//!
//! ## Design Principles
//!
//! 1. **Task First**: one-line instruction opens every prompt
//! 2. **Structured Blueprint**: numbered clause sequence per document type
//! 3. **Explicit Format**: literal JSON example the model must copy
//! 4. **Rules**: short bullet constraints (no newlines inside HTML strings)
//! 5. **Closing Cue**: final line tells the model to start emitting output

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::languages;
use crate::types::Context;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][\s\S]*>").expect("html sniff pattern is valid"));

/// Whether text looks like HTML (an opening tag followed by a closing `>`)
pub fn looks_like_html(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

/// System instructions paired with each prompt template
pub mod system {
    pub const CLAUSE_SET: &str = "You are a professional document generator. Generate structured, professional document clauses in JSON format with HTML content. Return ONLY valid JSON, nothing else.";

    pub const SINGLE_CLAUSE: &str =
        "Return ONLY valid JSON starting with { and ending with }. No explanations.";

    pub const TRANSLATE_HTML: &str = "You are an HTML-aware translator. Preserve ALL HTML tags while translating text content. Return ONLY the translated HTML.";

    pub const TRANSLATE_TEXT: &str = "You are a professional translator. Preserve placeholders and formatting. Return ONLY the translated text.";
}

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Numbered list with optional header
    Numbered {
        header: Option<String>,
        items: Vec<String>,
    },
    /// Bulleted list under a header
    Rules { header: String, items: Vec<String> },
    /// Caller-supplied values rendered as one JSON line
    Context(Context),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Custom section
    Custom(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numbered list
    pub fn numbered<I, S>(mut self, header: Option<&str>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PromptSection::Numbered {
            header: header.map(String::from),
            items: items.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add a bulleted rules section
    pub fn rules(mut self, header: &str, items: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Rules {
            header: header.to_string(),
            items: items.into_iter().map(String::from).collect(),
        });
        self
    }

    /// Add context section (skipped when empty)
    pub fn context(mut self, context: &Context) -> Self {
        if !context.is_empty() {
            self.sections.push(PromptSection::Context(context.clone()));
        }
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add custom section
    pub fn custom(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Custom(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Numbered { header, items } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}\n", h));
                    }
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Rules { header, items } => {
                    prompt.push_str(&format!("{}:\n", header));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Context(ctx) => {
                    // BTreeMap<String, String> serialization cannot fail
                    let json = serde_json::to_string(&ctx).unwrap_or_default();
                    prompt.push_str(&format!("Context: {}\n\n", json));
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}:\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Custom(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Clause Blueprints
// =============================================================================

/// Expected clause sequence for a known document type
#[derive(Debug, Clone, Copy)]
pub struct ClauseBlueprint {
    pub min_clauses: usize,
    /// (clause_type, description) in document order
    pub sections: &'static [(&'static str, &'static str)],
}

const OFFER_LETTER: ClauseBlueprint = ClauseBlueprint {
    min_clauses: 12,
    sections: &[
        ("header", "Company letterhead with logo area"),
        ("date", "Date of offer"),
        ("greeting", "Dear [Candidate Name]"),
        ("introduction", "We are pleased to offer you..."),
        ("position_details", "Job title, department, reporting structure"),
        ("start_date", "Expected start date"),
        ("compensation", "Base salary with table"),
        ("benefits", "Health, dental, retirement, vacation"),
        ("work_schedule", "Hours, location, remote policy"),
        ("probation", "Probation period details"),
        ("conditions", "Background check, drug test if applicable"),
        ("closing", "Acceptance deadline"),
        ("signature", "Signature blocks for both parties"),
    ],
};

const NDA: ClauseBlueprint = ClauseBlueprint {
    min_clauses: 10,
    sections: &[
        ("header", "NDA title and date"),
        ("parties", "Party A and Party B details"),
        ("recitals", "Whereas clauses"),
        ("definitions", "Define Confidential Information"),
        ("obligations", "Duty to protect information"),
        ("exclusions", "What is NOT confidential"),
        ("term", "Duration of agreement"),
        ("return", "Return of materials"),
        ("remedies", "Legal remedies for breach"),
        ("general", "Governing law, jurisdiction"),
        ("signatures", "Both party signatures"),
    ],
};

const CONTRACT: ClauseBlueprint = ClauseBlueprint {
    min_clauses: 12,
    sections: &[
        ("header", "Contract title"),
        ("parties", "Full party details"),
        ("recitals", "Background and purpose"),
        ("scope", "Scope of work"),
        ("deliverables", "What will be delivered"),
        ("timeline", "Project schedule"),
        ("payment", "Payment terms and schedule"),
        ("warranties", "Warranties and representations"),
        ("liability", "Limitation of liability"),
        ("termination", "Termination conditions"),
        ("dispute", "Dispute resolution"),
        ("general", "General provisions"),
        ("signatures", "Execution blocks"),
    ],
};

const INVOICE: ClauseBlueprint = ClauseBlueprint {
    min_clauses: 10,
    sections: &[
        ("header", "Invoice header with logo"),
        ("invoice_info", "Invoice number and date"),
        ("bill_to", "Bill to information"),
        ("ship_to", "Ship to information"),
        ("items_table", "Itemized list with prices"),
        ("subtotal", "Subtotal calculation"),
        ("tax", "Tax amount"),
        ("total", "Total amount due"),
        ("payment_terms", "Payment terms and methods"),
        ("notes", "Additional notes or thank you"),
    ],
};

/// Minimum clause count requested for document types without a blueprint
pub const GENERIC_MIN_CLAUSES: usize = 10;

/// Blueprint for a known document type
pub fn blueprint_for(document_type: &str) -> Option<&'static ClauseBlueprint> {
    use crate::constants::document_types as types;

    match document_type {
        types::OFFER_LETTER => Some(&OFFER_LETTER),
        types::NDA => Some(&NDA),
        types::CONTRACT => Some(&CONTRACT),
        types::INVOICE => Some(&INVOICE),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Full clause set for a document type
    pub fn clause_set(document_type: &str, context: &Context) -> String {
        let mut builder = PromptBuilder::new().custom(&format!(
            "Generate a complete {} with ALL required clauses. Return ONLY valid JSON.",
            document_type
        ));

        builder = match blueprint_for(document_type) {
            Some(blueprint) => builder
                .custom(&format!(
                    "REQUIRED: Generate {} clauses minimum.",
                    blueprint.min_clauses
                ))
                .numbered(
                    None,
                    blueprint
                        .sections
                        .iter()
                        .map(|(clause_type, description)| format!("{} - {}", clause_type, description)),
                ),
            None => builder
                .custom(&format!(
                    "REQUIRED: Generate {} clauses minimum.",
                    GENERIC_MIN_CLAUSES
                ))
                .text(&format!(
                    "Generate 10-12 professional clauses appropriate for {}",
                    document_type
                )),
        };

        builder
            .section(
                "FORMAT (NO explanations, NO markdown)",
                &format!(
                    r#"{{"clauses":[{{"clause_type":"header","content":"<h1>Text</h1>","category":"{}"}}]}}"#,
                    document_type
                ),
            )
            .rules(
                "RULES",
                vec![
                    "Each clause needs clause_type, content, category",
                    "Use simple HTML: <h1>, <h2>, <p>, <ul>, <ol>, <table>",
                    "Use [Company Name], [Candidate Name] for variables",
                    "NO newlines inside HTML strings",
                    "Generate COMPLETE professional document",
                ],
            )
            .context(context)
            .custom("Generate JSON now:")
            .build()
    }

    /// One clause of a given type
    pub fn single_clause(clause_type: &str, category: &str, context: &Context) -> String {
        PromptBuilder::new()
            .custom(&format!(
                "Generate ONE professional {} clause with HTML.",
                clause_type
            ))
            .custom(&format!("Category: {}", category))
            .context(context)
            .section(
                "Return ONLY this JSON (NO markdown)",
                &format!(
                    r#"{{"clause":{{"clause_type":"{}","content":"<p>Professional content here with [Placeholders]</p>"}}}}"#,
                    clause_type
                ),
            )
            .rules(
                "Requirements",
                vec![
                    "Professional business tone",
                    "Use proper HTML tags",
                    "Include relevant placeholders",
                    "Keep it concise but complete",
                ],
            )
            .custom("Generate:")
            .build()
    }

    /// Translation of HTML or plain text into a target language
    pub fn translation(text: &str, target_lang: &str, is_html: bool) -> String {
        let language = languages::display_name(target_lang);

        if is_html {
            PromptBuilder::new()
                .custom(&format!(
                    "Translate this business document content to {}.",
                    language
                ))
                .numbered(
                    Some("CRITICAL RULES:"),
                    [
                        format!("Translate ALL text content to {}", language),
                        "Keep ALL HTML tags exactly as they are".to_string(),
                        "Keep placeholders like [Company Name] unchanged".to_string(),
                        "Use professional business language".to_string(),
                        "Maintain the same formatting structure".to_string(),
                    ],
                )
                .section("ORIGINAL", text)
                .custom(&format!("TRANSLATED TO {}:", language.to_uppercase()))
                .build()
        } else {
            PromptBuilder::new()
                .custom(&format!("Translate this to {}.", language))
                .numbered(
                    Some("RULES:"),
                    [
                        format!("Translate to {} completely", language),
                        "Keep [Placeholders] in English".to_string(),
                        "Professional business tone".to_string(),
                        "Maintain formatting".to_string(),
                    ],
                )
                .section("ORIGINAL", text)
                .custom(&format!("{} TRANSLATION:", language.to_uppercase()))
                .build()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_builder() {
        let prompt = PromptBuilder::new()
            .custom("Do the thing.")
            .numbered(Some("Steps:"), ["one", "two"])
            .rules("RULES", vec!["be brief"])
            .build();

        assert!(prompt.starts_with("Do the thing."));
        assert!(prompt.contains("Steps:\n1. one\n2. two"));
        assert!(prompt.contains("RULES:\n- be brief"));
        assert!(!prompt.ends_with('\n'));
    }

    #[test]
    fn test_empty_context_skipped() {
        let prompt = PromptBuilder::new().context(&Context::new()).custom("x").build();
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_context_serialized_as_json() {
        let mut ctx = Context::new();
        ctx.insert("Company Name".to_string(), "Acme".to_string());
        let prompt = PromptBuilder::new().context(&ctx).build();
        assert_eq!(prompt, r#"Context: {"Company Name":"Acme"}"#);
    }

    #[test]
    fn test_clause_set_uses_blueprint() {
        let prompt = PromptTemplates::clause_set("nda", &Context::new());
        assert!(prompt.contains("Generate 10 clauses minimum"));
        assert!(prompt.contains("1. header - NDA title and date"));
        assert!(prompt.contains("11. signatures - Both party signatures"));
        assert!(prompt.contains(r#""category":"nda""#));
        assert!(prompt.ends_with("Generate JSON now:"));
    }

    #[test]
    fn test_clause_set_generic_type() {
        let prompt = PromptTemplates::clause_set("lease", &Context::new());
        assert!(prompt.contains("appropriate for lease"));
        assert!(blueprint_for("lease").is_none());
    }

    #[test]
    fn test_single_clause_prompt() {
        let prompt = PromptTemplates::single_clause("termination", "contract", &Context::new());
        assert!(prompt.contains("ONE professional termination clause"));
        assert!(prompt.contains("Category: contract"));
        assert!(prompt.contains(r#"{"clause":{"clause_type":"termination""#));
    }

    #[test]
    fn test_translation_prompt_variants() {
        let html = PromptTemplates::translation("<p>Hello</p>", "es", true);
        assert!(html.contains("Keep ALL HTML tags"));
        assert!(html.ends_with("TRANSLATED TO SPANISH:"));

        let plain = PromptTemplates::translation("Hello", "xx", false);
        assert!(plain.contains("Translate this to xx."));
        assert!(plain.ends_with("XX TRANSLATION:"));
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<p>Hello</p>"));
        assert!(looks_like_html("text <B>bold</B>"));
        assert!(!looks_like_html("a < b > c"));
        assert!(!looks_like_html("plain [Name]"));
    }
}
