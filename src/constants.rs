//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Local model (Ollama) provider constants
pub mod ollama {
    pub const NAME: &str = "ollama";
    pub const DEFAULT_HOST: &str = "http://localhost:11434";
    pub const DEFAULT_MODEL: &str = "llama3.2:3b";

    /// Generation timeout (local models are slow)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Reachability probe timeout
    pub const PROBE_TIMEOUT_SECS: u64 = 3;

    /// Upper bound on generated tokens per call
    pub const NUM_PREDICT: u32 = 2000;
}

/// Cloud router (OpenRouter) provider constants
pub mod openrouter {
    pub const NAME: &str = "openrouter";
    pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
    pub const DEFAULT_FALLBACK_MODELS: &[&str] = &[
        "google/gemini-flash-1.5",
        "qwen/qwen-2-7b-instruct",
        "mistralai/mistral-7b-instruct",
    ];
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Attribution headers sent with every request
    pub const REFERER: &str = "http://localhost:5000";
    pub const TITLE: &str = "docsmith";
}

/// Direct vendor (OpenAI) provider constants
pub mod openai {
    pub const NAME: &str = "openai";
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

/// Sampling temperatures per operation
pub mod temperature {
    pub const GENERATION: f32 = 0.7;
    pub const TRANSLATION: f32 = 0.3;
}

/// Document layer constants
pub mod document {
    /// Category assigned to generated clauses that omit one
    pub const DEFAULT_CATEGORY: &str = "general";

    /// Pause between successive clause translations (milliseconds)
    pub const TRANSLATION_DELAY_MS: u64 = 500;

    /// Row columns checked, in order, to name a bulk-generated document
    pub const IDENTIFIER_COLUMNS: &[&str] =
        &["Employee Name", "Full Name", "Name", "Candidate Name"];
}

/// Known document types and their display labels
pub mod document_types {
    pub const OFFER_LETTER: &str = "offer_letter";
    pub const NDA: &str = "nda";
    pub const CONTRACT: &str = "contract";
    pub const INVOICE: &str = "invoice";

    pub const LABELS: &[(&str, &str)] = &[
        ("offer_letter", "Offer Letter"),
        ("nda", "Non-Disclosure Agreement"),
        ("contract", "Contract"),
        ("invoice", "Invoice"),
        ("agreement", "Agreement"),
        ("proposal", "Proposal"),
        ("memo", "Memorandum"),
        ("policy", "Policy Document"),
    ];

    pub fn label(document_type: &str) -> Option<&'static str> {
        LABELS
            .iter()
            .find(|(key, _)| *key == document_type)
            .map(|(_, label)| *label)
    }
}

/// Supported translation languages
pub mod languages {
    pub const NAMES: &[(&str, &str)] = &[
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("de", "German"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
        ("zh", "Chinese"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("ar", "Arabic"),
        ("hi", "Hindi"),
    ];

    /// Display name for a language code, falling back to the code itself
    pub fn display_name(code: &str) -> &str {
        NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
            .unwrap_or(code)
    }

    pub fn is_supported(code: &str) -> bool {
        NAMES.iter().any(|(c, _)| *c == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display_name() {
        assert_eq!(languages::display_name("es"), "Spanish");
        assert_eq!(languages::display_name("xx"), "xx");
        assert!(languages::is_supported("hi"));
        assert!(!languages::is_supported("klingon"));
    }

    #[test]
    fn test_document_type_label() {
        assert_eq!(document_types::label("nda"), Some("Non-Disclosure Agreement"));
        assert_eq!(document_types::label("unknown"), None);
    }
}
