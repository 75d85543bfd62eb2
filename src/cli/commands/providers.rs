//! Providers Command
//!
//! Show the active fallback order and, optionally, probe each provider.

use crate::ai::AiService;
use crate::ai::provider::create_provider;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::types::Result;

pub async fn run(config: &Config, as_json: bool, check: bool) -> Result<()> {
    let service = AiService::from_config(config)?;
    let summary = service.summary();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let output = Output::new();
    output.header("AI Providers");
    output.field("Primary", &summary.primary);
    output.field(
        "Order",
        &if summary.providers.is_empty() {
            "(none)".to_string()
        } else {
            summary.providers.join(" -> ")
        },
    );
    output.field("Output", summary.output_format);

    output.section("Models");
    for (provider, model) in &summary.models {
        output.field(provider, model);
    }

    if !check {
        return Ok(());
    }

    output.section("Health");
    for kind in config.ai.active_providers() {
        let provider = create_provider(kind, &config.ai)?;
        if provider.health_check().await {
            output.success(&format!("{} reachable ({})", kind, provider.model()));
        } else {
            output.warning(&format!("{} not reachable", kind));
        }
    }

    Ok(())
}
