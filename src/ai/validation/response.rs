//! Clause Shape Validation
//!
//! Minimal structural contracts for parsed model output. Missing required
//! fields are rejected; only a missing category is filled in.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::{Result, ValidationError, ValidationErrorKind};

/// One generated clause; `content` is HTML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedClause {
    pub clause_type: String,
    pub content: String,
    pub category: String,
}

/// Ordered, non-empty list of generated clauses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedClauseSet {
    pub clauses: Vec<GeneratedClause>,
}

impl GeneratedClauseSet {
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Validate a `{"clauses": [...]}` response
///
/// Every element needs a non-empty `clause_type` and `content`; a missing or
/// blank `category` becomes `default_category`.
pub fn validate_clause_set(value: &Value, default_category: &str) -> Result<GeneratedClauseSet> {
    let items = value
        .get("clauses")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ValidationError::missing_field("clauses", "AI response missing \"clauses\" array")
        })?;

    if items.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::Empty,
            "AI generated empty clause set",
        )
        .with_field("clauses")
        .into());
    }

    let mut clauses = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let clause_type = required_str(item, "clause_type", index)?;
        let content = required_str(item, "content", index)?;
        let category = non_empty_str(item, "category").unwrap_or_else(|| {
            debug!(index, "Clause missing category, using '{}'", default_category);
            default_category.to_string()
        });

        clauses.push(GeneratedClause {
            clause_type,
            content,
            category,
        });
    }

    Ok(GeneratedClauseSet { clauses })
}

/// Validate a `{"clause": {...}}` response; the nested clause needs content.
///
/// `clause_type` falls back to the requested type and `category` to the
/// requested category when the model leaves them out.
pub fn validate_single_clause(
    value: &Value,
    clause_type: &str,
    category: &str,
) -> Result<GeneratedClause> {
    let clause = value
        .get("clause")
        .filter(|c| c.is_object())
        .ok_or_else(|| {
            ValidationError::missing_field("clause", "AI response missing \"clause\" object")
        })?;

    let content = non_empty_str(clause, "content").ok_or_else(|| {
        ValidationError::missing_field(
            "clause.content",
            "AI response missing \"clause\" object with content",
        )
    })?;

    Ok(GeneratedClause {
        clause_type: non_empty_str(clause, "clause_type").unwrap_or_else(|| clause_type.to_string()),
        content,
        category: non_empty_str(clause, "category").unwrap_or_else(|| category.to_string()),
    })
}

fn non_empty_str(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required_str(item: &Value, field: &str, index: usize) -> Result<String> {
    non_empty_str(item, field).ok_or_else(|| {
        ValidationError::missing_field(
            format!("clauses[{}].{}", index, field),
            "Clause missing required fields (clause_type, content)",
        )
        .into()
    })
}
