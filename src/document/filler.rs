//! Placeholder filling and extraction for `[Key]` tokens.

use std::sync::LazyLock;

use regex::Regex;

use super::{Clause, Template};
use crate::types::Context;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("placeholder pattern is valid"));

/// Replace every `[Key]` with its context value.
///
/// Empty values leave the token in place. The filled clause always carries
/// `content_html`, falling back to the filled plain content.
pub fn fill_clause(clause: &Clause, context: &Context) -> Clause {
    let mut content = clause.content.clone();
    let mut content_html = clause.content_html.clone().filter(|h| !h.is_empty());

    for (key, value) in context {
        let token = format!("[{}]", key);
        let replacement = if value.is_empty() { &token } else { value };

        content = content.replace(&token, replacement);
        if let Some(html) = content_html.as_mut() {
            *html = html.replace(&token, replacement);
        }
    }

    Clause {
        content_html: Some(content_html.unwrap_or_else(|| content.clone())),
        content,
        ..clause.clone()
    }
}

pub fn fill_clauses(clauses: &[Clause], context: &Context) -> Vec<Clause> {
    clauses.iter().map(|c| fill_clause(c, context)).collect()
}

/// Placeholder names in order of appearance (trimmed, may repeat)
pub fn extract_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Distinct placeholder names across a template's clauses, first-seen order
pub fn template_placeholders(template: &Template) -> Vec<String> {
    let mut seen = Vec::new();

    for clause in &template.clauses {
        let html = clause.content_html.as_deref().unwrap_or_default();
        for name in extract_placeholders(&clause.content)
            .into_iter()
            .chain(extract_placeholders(html))
        {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }

    seen
}
