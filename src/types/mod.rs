pub mod error;

pub use error::{
    DocError, ErrorCategory, LlmError, Result, ValidationError, ValidationErrorKind,
};

use std::collections::BTreeMap;

/// Placeholder values keyed by placeholder name (`[Candidate Name]` → `Candidate Name`)
///
/// Ordered so prompts and logs render deterministically.
pub type Context = BTreeMap<String, String>;
