//! Bulk Generation
//!
//! One document per input row. Rows are processed sequentially; AI mode
//! makes one generation call per row and records per-row failures instead
//! of aborting the batch.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{Clause, Document, Template, filler};
use crate::ai::AiService;
use crate::constants::document::IDENTIFIER_COLUMNS;
use crate::types::{Context, DocError, Result, ValidationError, ValidationErrorKind};

/// A row that could not be turned into a document
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// 1-based row number
    pub row: usize,
    pub message: String,
}

/// Documents produced by a bulk run plus the rows that failed
#[derive(Debug, Default, Serialize)]
pub struct BulkOutcome {
    pub documents: Vec<Document>,
    pub failures: Vec<RowFailure>,
    pub tokens_used: u64,
}

impl BulkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BulkGenerator<'a> {
    ai: &'a AiService,
}

impl<'a> BulkGenerator<'a> {
    pub fn new(ai: &'a AiService) -> Self {
        Self { ai }
    }

    /// Fill a template once per row.
    ///
    /// Every template placeholder must be a column of the first row.
    pub fn from_template(template: &Template, rows: &[Context]) -> Result<Vec<Document>> {
        validate_columns(template, rows)?;

        let documents = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let clauses = filler::fill_clauses(&template.clauses, row);
                Document::new(
                    format!("{}_{}", template.template_name, row_identifier(row, index + 1)),
                    &template.document_type,
                    clauses,
                    row.clone(),
                )
                .with_template(template.id)
            })
            .collect::<Vec<_>>();

        info!(
            template = %template.template_name,
            documents = documents.len(),
            "Bulk template generation complete"
        );

        Ok(documents)
    }

    /// Generate a fresh clause set per row with the AI.
    ///
    /// Generation failures are recorded per row; a configuration error aborts
    /// the whole run.
    pub async fn from_ai(&self, document_type: &str, rows: &[Context]) -> Result<BulkOutcome> {
        if rows.is_empty() {
            return Err(DocError::Bulk("Input rows are empty".to_string()));
        }

        let mut outcome = BulkOutcome::default();

        for (index, row) in rows.iter().enumerate() {
            let row_num = index + 1;
            info!("Row {}/{}: generating {}", row_num, rows.len(), document_type);

            match self.ai.generate_clauses(document_type, row).await {
                Ok(generation) => {
                    let clauses: Vec<Clause> =
                        generation.clauses.into_iter().map(Clause::from).collect();
                    outcome.tokens_used += u64::from(generation.attribution.tokens_used);
                    outcome.documents.push(Document::new(
                        format!("{}_{}", document_type, row_identifier(row, row_num)),
                        document_type,
                        filler::fill_clauses(&clauses, row),
                        row.clone(),
                    ));
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    warn!("AI generation failed for row {}: {}", row_num, e);
                    outcome.failures.push(RowFailure {
                        row: row_num,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }
}

/// Reject empty input and rows missing any template placeholder column
pub fn validate_columns(template: &Template, rows: &[Context]) -> Result<()> {
    let first = rows
        .first()
        .ok_or_else(|| DocError::Bulk("Input rows are empty".to_string()))?;

    let missing: Vec<String> = filler::template_placeholders(template)
        .into_iter()
        .filter(|placeholder| !first.contains_key(placeholder))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(
            ValidationErrorKind::Columns,
            format!("Missing columns: {}", missing.join(", ")),
        )
        .into())
    }
}

/// Name fragment for a row: a well-known name column, else the first
/// non-blank value, else `Row{n}`; reduced to ASCII alphanumerics.
pub fn row_identifier(row: &Context, row_num: usize) -> String {
    let identifier = IDENTIFIER_COLUMNS
        .iter()
        .filter_map(|column| row.get(*column))
        .find(|value| !value.is_empty())
        .or_else(|| row.values().find(|value| !value.trim().is_empty()))
        .cloned()
        .unwrap_or_else(|| format!("Row{}", row_num));

    clean_for_filename(&identifier)
}

pub fn clean_for_filename(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Convert a JSON array of row objects into contexts.
///
/// Strings are kept as-is, null becomes empty, other scalars use their JSON text.
pub fn rows_from_json(value: &Value) -> Result<Vec<Context>> {
    let rows = value
        .as_array()
        .ok_or_else(|| DocError::Bulk("Rows must be a JSON array of objects".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| -> Result<Context> {
            let object = row.as_object().ok_or_else(|| {
                DocError::Bulk(format!("Row {} is not a JSON object", index + 1))
            })?;

            Ok(object
                .iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key.clone(), text)
                })
                .collect())
        })
        .collect()
}
