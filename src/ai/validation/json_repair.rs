//! JSON Repair Mechanism
//!
//! Extraction and repair for model output that should be a single JSON object.
//!
//! Handles common LLM JSON output issues:
//! - Markdown code fence wrapping (```json ... ```)
//! - JSON embedded in explanatory text
//! - Literal newlines and tabs inside string values
//!
//! Repair order:
//! 1. Strip fences, take the first `{` through the last `}`
//! 2. Escape control characters inside value strings, then parse
//! 3. On failure, collapse whitespace inside every string and parse once more

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{DocError, Result};

static QUOTED_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\\]*(\\.[^"\\]*)*)""#).expect("quoted string pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// =============================================================================
// Convenience Functions
// =============================================================================

/// Extract, repair, and parse the JSON object in a model response
///
/// This is the primary entry point for parsing LLM JSON output.
pub fn parse_llm_json(raw: &str) -> Result<Value> {
    JsonRepairer::new().parse_or_repair(raw).map(|(value, _)| value)
}

/// Extract and parse JSON, returning whether the whitespace fallback was needed
pub fn parse_llm_json_with_repair_status(raw: &str) -> Result<(Value, bool)> {
    JsonRepairer::new().parse_or_repair(raw)
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// Stateless repair pipeline; every step is a pure text transform
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRepairer;

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Parse JSON, attempting the aggressive repair if the first parse fails
    ///
    /// Returns (Value, was_aggressively_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let stripped = strip_code_fences(raw);
        let candidate = extract_json_candidate(&stripped)?;
        let escaped = escape_control_chars(candidate);

        let first_error = match serde_json::from_str::<Value>(&escaped) {
            Ok(value) => return Ok((value, false)),
            Err(e) => e,
        };

        debug!("Initial JSON parse failed ({}), collapsing string whitespace", first_error);

        let collapsed = collapse_string_whitespace(&escaped);
        match serde_json::from_str::<Value>(&collapsed) {
            Ok(value) => {
                warn!("JSON repaired by collapsing whitespace inside strings");
                Ok((value, true))
            }
            Err(_) => {
                warn!(
                    "JSON parse failed. Content preview: {}...",
                    escaped.chars().take(200).collect::<String>()
                );
                Err(DocError::InvalidJson(first_error.to_string()))
            }
        }
    }
}

// =============================================================================
// Repair Steps
// =============================================================================

/// Remove a leading fence line (```json or ```) and a trailing ``` marker
pub fn strip_code_fences(raw: &str) -> String {
    let mut s = raw.trim();

    if s.starts_with("```") {
        s = match s.find('\n') {
            Some(first_newline) => &s[first_newline + 1..],
            None => s.trim_start_matches('`').trim_start_matches("json"),
        };
    }

    if let Some(stripped) = s.trim_end().strip_suffix("```") {
        s = stripped;
    }

    s.trim().to_string()
}

/// Slice from the first `{` through the last `}`
pub fn extract_json_candidate(text: &str) -> Result<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if last > first => Ok(&text[first..=last]),
        _ => {
            debug!(
                "No JSON object found: {}",
                text.chars().take(200).collect::<String>()
            );
            Err(DocError::NoJsonObject)
        }
    }
}

/// Scanner position relative to JSON strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InKey { escaped: bool },
    InValue { escaped: bool },
}

/// Innermost open container while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object { expect_key: bool },
    Array,
}

/// Rewrite literal newline, carriage return, and tab inside value strings
/// as their two-character escapes.
///
/// Key strings and text outside strings pass through unchanged. A string
/// opens in key position when its innermost container is an object that is
/// waiting for a key (right after `{` or `,`).
pub fn escape_control_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut state = ScanState::Outside;
    let mut stack: Vec<Container> = Vec::new();

    for ch in input.chars() {
        state = match state {
            ScanState::Outside => {
                match ch {
                    '{' => stack.push(Container::Object { expect_key: true }),
                    '[' => stack.push(Container::Array),
                    '}' | ']' => {
                        stack.pop();
                    }
                    ',' => {
                        if let Some(Container::Object { expect_key }) = stack.last_mut() {
                            *expect_key = true;
                        }
                    }
                    ':' => {
                        if let Some(Container::Object { expect_key }) = stack.last_mut() {
                            *expect_key = false;
                        }
                    }
                    _ => {}
                }
                out.push(ch);

                if ch == '"' {
                    match stack.last() {
                        Some(Container::Object { expect_key: true }) => {
                            ScanState::InKey { escaped: false }
                        }
                        _ => ScanState::InValue { escaped: false },
                    }
                } else {
                    ScanState::Outside
                }
            }
            ScanState::InKey { escaped } => {
                out.push(ch);
                match ch {
                    _ if escaped => ScanState::InKey { escaped: false },
                    '\\' => ScanState::InKey { escaped: true },
                    '"' => {
                        if let Some(Container::Object { expect_key }) = stack.last_mut() {
                            *expect_key = false;
                        }
                        ScanState::Outside
                    }
                    _ => ScanState::InKey { escaped: false },
                }
            }
            ScanState::InValue { escaped } => match ch {
                _ if escaped => {
                    out.push(ch);
                    ScanState::InValue { escaped: false }
                }
                '\\' => {
                    out.push(ch);
                    ScanState::InValue { escaped: true }
                }
                '"' => {
                    out.push(ch);
                    ScanState::Outside
                }
                '\n' => {
                    out.push_str("\\n");
                    ScanState::InValue { escaped: false }
                }
                '\r' => {
                    out.push_str("\\r");
                    ScanState::InValue { escaped: false }
                }
                '\t' => {
                    out.push_str("\\t");
                    ScanState::InValue { escaped: false }
                }
                _ => {
                    out.push(ch);
                    ScanState::InValue { escaped: false }
                }
            },
        };
    }

    out
}

/// Collapse every whitespace run inside quoted strings to a single space
pub fn collapse_string_whitespace(input: &str) -> String {
    QUOTED_STRING
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let cleaned = caps[0].replace('\r', "");
            WHITESPACE_RUN.replace_all(&cleaned, " ").into_owned()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_json() {
        let (value, repaired) = parse_llm_json_with_repair_status(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value["key"], "value");
        assert!(!repaired);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_extracts_between_outer_braces() {
        let raw = "Sure! Here is the result:\n```json\n{\"clauses\": [{\"a\": {\"b\": 1}}]}\n```\nLet me know.";
        let stripped = strip_code_fences(raw);
        let candidate = extract_json_candidate(&stripped).unwrap();
        assert_eq!(candidate, "{\"clauses\": [{\"a\": {\"b\": 1}}]}");

        let value = parse_llm_json(raw).unwrap();
        assert_eq!(value["clauses"][0]["a"]["b"], 1);
    }

    #[test]
    fn test_repairer_handles_fenced_reply_with_raw_newline() {
        let raw = "```json\n{\"content\": \"first\nsecond\"}\n```";
        let (value, repaired) = JsonRepairer::new().parse_or_repair(raw).unwrap();
        assert_eq!(value["content"], "first\nsecond");
        assert!(!repaired);
    }

    #[test]
    fn test_no_braces_is_no_json_object() {
        assert!(matches!(
            parse_llm_json("I cannot help with that."),
            Err(DocError::NoJsonObject)
        ));
        assert!(matches!(parse_llm_json("} backwards {"), Err(DocError::NoJsonObject)));
        assert!(matches!(parse_llm_json(""), Err(DocError::NoJsonObject)));
    }

    #[test]
    fn test_raw_newline_in_value_is_escaped() {
        let raw = "{\"content\": \"line one\nline two\"}";
        let value = parse_llm_json(raw).unwrap();
        assert_eq!(value["content"], "line one\nline two");
    }

    #[test]
    fn test_tabs_and_carriage_returns_in_value() {
        let raw = "{\"content\": \"a\tb\r\nc\"}";
        let value = parse_llm_json(raw).unwrap();
        assert_eq!(value["content"], "a\tb\r\nc");
    }

    #[test]
    fn test_key_strings_untouched() {
        let input = "{\"key\nname\": \"v\nw\"}";
        assert_eq!(escape_control_chars(input), "{\"key\nname\": \"v\\nw\"}");
    }

    #[test]
    fn test_structural_whitespace_untouched() {
        let input = "{\n\t\"a\": [\n\t\t\"x\",\n\t\t\"y\"\n\t]\n}";
        assert_eq!(escape_control_chars(input), input);
    }

    #[test]
    fn test_array_strings_are_values() {
        let input = "{\"items\": [\"one\ntwo\", \"three\"]}";
        assert_eq!(
            escape_control_chars(input),
            "{\"items\": [\"one\\ntwo\", \"three\"]}"
        );
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let input = "{\"a\": \"say \\\"hi\\\"\nnow\"}";
        let value = parse_llm_json(input).unwrap();
        assert_eq!(value["a"], "say \"hi\"\nnow");
    }

    #[test]
    fn test_existing_escapes_preserved() {
        let input = r#"{"a": "already\nescaped"}"#;
        assert_eq!(escape_control_chars(input), input);
    }

    #[test]
    fn test_collapse_string_whitespace() {
        assert_eq!(
            collapse_string_whitespace("{\"a\": \"x   y\", \"b\":  1}"),
            "{\"a\": \"x y\", \"b\":  1}"
        );
    }

    #[test]
    fn test_aggressive_fallback_rescues_raw_newline_in_key() {
        let raw = "{\"clause\nkey\": \"value\"}";
        let (value, repaired) = parse_llm_json_with_repair_status(raw).unwrap();
        assert!(repaired);
        assert_eq!(value["clause key"], "value");
    }

    #[test]
    fn test_unrecoverable_is_invalid_json() {
        let err = parse_llm_json("{\"a\": tru}").unwrap_err();
        assert!(matches!(err, DocError::InvalidJson(_)));
        assert!(err.is_malformed_output());
    }

    proptest! {
        #[test]
        fn prop_value_text_survives_round_trip(text in "[a-zA-Z0-9 .,\n\t]{0,64}") {
            let raw = format!("Here you go:\n```json\n{{\"content\": \"{}\"}}\n```", text);
            let value = parse_llm_json(&raw).unwrap();
            prop_assert_eq!(value["content"].as_str().unwrap(), text.as_str());
        }

        #[test]
        fn prop_escaping_without_control_chars_is_identity(text in "[a-zA-Z0-9 {}:,\\[\\]\"]{0,64}") {
            prop_assert_eq!(escape_control_chars(&text), text);
        }
    }
}
