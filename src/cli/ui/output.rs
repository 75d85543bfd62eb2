use console::style;

use crate::ai::Attribution;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: &str) {
        println!("  {:<12} {}", style(format!("{}:", label)).dim(), value);
    }

    /// Which provider and model answered, on stderr so stdout stays pipeable
    pub fn attribution(&self, attribution: &Attribution) {
        eprintln!(
            "{} {} / {} ({} tokens)",
            style("⚡").cyan(),
            attribution.provider,
            attribution.model,
            attribution.tokens_used
        );
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
