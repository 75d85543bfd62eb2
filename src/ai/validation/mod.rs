//! AI Response Parsing and Validation
//!
//! - JSON extraction and repair for unreliable model output
//! - Shape contracts for clause sets and single clauses
//!
//! ## Design Philosophy
//! - Repair format issues, fail loudly on structural errors
//! - Never coerce a malformed response into a partial result

mod json_repair;
mod response;

pub use json_repair::{
    JsonRepairer, collapse_string_whitespace, escape_control_chars, extract_json_candidate,
    parse_llm_json, parse_llm_json_with_repair_status, strip_code_fences,
};
pub use response::{
    GeneratedClause, GeneratedClauseSet, validate_clause_set, validate_single_clause,
};

use crate::types::Result;

/// Parse raw model output into a validated clause set
pub fn parse_clause_set(raw: &str, default_category: &str) -> Result<GeneratedClauseSet> {
    let value = parse_llm_json(raw)?;
    validate_clause_set(&value, default_category)
}

/// Parse raw model output into a single validated clause
pub fn parse_single_clause(raw: &str, clause_type: &str, category: &str) -> Result<GeneratedClause> {
    let value = parse_llm_json(raw)?;
    validate_single_clause(&value, clause_type, category)
}
