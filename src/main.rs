use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docsmith::cli::commands::bulk::BulkSource;
use docsmith::cli::commands::generate::GenerateSource;
use docsmith::cli::util::context_from_pairs;
use docsmith::cli::{load_config, parse_context_pair};

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(
    version,
    about = "AI-assisted business document generator with multi-provider fallback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Use this config file only")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a raw prompt through the provider chain
    Complete {
        #[arg(help = "User prompt")]
        prompt: String,
        #[arg(long, short, help = "System prompt")]
        system: Option<String>,
        #[arg(long, short, default_value = "0.7")]
        temperature: f32,
    },

    /// Generate a clause set for a document type
    Clauses {
        #[arg(help = "Document type (offer_letter, nda, contract, invoice, ...)")]
        document_type: String,
        #[arg(short = 'c', long = "context", value_parser = parse_context_pair, help = "Context value as KEY=VALUE (repeatable)")]
        context: Vec<(String, String)>,
        #[arg(long, short, help = "Write JSON here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Generate a single clause
    Clause {
        #[arg(help = "Clause type, e.g. confidentiality")]
        clause_type: String,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(short = 'c', long = "context", value_parser = parse_context_pair)]
        context: Vec<(String, String)>,
    },

    /// Translate text or HTML
    Translate {
        text: String,
        #[arg(long, short, help = "Target language code (es, fr, de, ...)")]
        lang: String,
    },

    /// Translate a saved document clause by clause
    TranslateDocument {
        #[arg(help = "Document JSON file")]
        file: PathBuf,
        #[arg(long, short)]
        lang: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate a reusable template with the AI
    Template {
        #[arg(help = "Template name")]
        name: String,
        #[arg(long = "type", help = "Document type (offer_letter, nda, contract, invoice, ...)")]
        document_type: String,
        #[arg(short = 'c', long = "context", value_parser = parse_context_pair)]
        context: Vec<(String, String)>,
        #[arg(long, short, help = "Write the template JSON here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Create a document from a template, clause file, or the AI
    Generate {
        document_type: String,
        #[arg(long, short, conflicts_with = "clauses", help = "Template JSON file")]
        template: Option<PathBuf>,
        #[arg(long, help = "JSON array of clauses to save as-is")]
        clauses: Option<PathBuf>,
        #[arg(short = 'c', long = "context", value_parser = parse_context_pair)]
        context: Vec<(String, String)>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create one document per row of a JSON array
    Bulk {
        #[arg(help = "JSON array of row objects")]
        rows: PathBuf,
        #[arg(long, short, required_unless_present = "document_type", conflicts_with = "document_type")]
        template: Option<PathBuf>,
        #[arg(long = "type", help = "Generate each row with the AI for this document type")]
        document_type: Option<String>,
        #[arg(long, short, help = "Directory for one JSON file per document")]
        output: Option<PathBuf>,
    },

    /// Show active providers in fallback order
    Providers {
        #[arg(long)]
        json: bool,
        #[arg(long, help = "Probe each active provider")]
        check: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocsmith encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // stdout carries command output; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config;
    let rt = Runtime::new()?;

    match cli.command {
        Commands::Complete {
            prompt,
            system,
            temperature,
        } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::generate::complete(
                &config,
                &prompt,
                system.as_deref(),
                temperature,
            ))?;
        }
        Commands::Clauses {
            document_type,
            context,
            output,
        } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::generate::clauses(
                &config,
                &document_type,
                &context_from_pairs(context),
                output,
            ))?;
        }
        Commands::Clause {
            clause_type,
            category,
            context,
        } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::generate::clause(
                &config,
                &clause_type,
                &category,
                &context_from_pairs(context),
            ))?;
        }
        Commands::Translate { text, lang } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::translate::text(&config, &text, &lang))?;
        }
        Commands::TranslateDocument { file, lang, output } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::translate::document(
                &config, &file, &lang, output,
            ))?;
        }
        Commands::Template {
            name,
            document_type,
            context,
            output,
        } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::generate::template(
                &config,
                &name,
                &document_type,
                &context_from_pairs(context),
                output,
            ))?;
        }
        Commands::Generate {
            document_type,
            template,
            clauses,
            context,
            output,
        } => {
            let config = load_config(config_path.as_deref())?;
            let source = match (template, clauses) {
                (Some(path), _) => GenerateSource::Template(path),
                (None, Some(path)) => GenerateSource::Clauses(path),
                (None, None) => GenerateSource::Ai,
            };
            rt.block_on(docsmith::cli::commands::generate::document(
                &config,
                &document_type,
                source,
                &context_from_pairs(context),
                output,
            ))?;
        }
        Commands::Bulk {
            rows,
            template,
            document_type,
            output,
        } => {
            let config = load_config(config_path.as_deref())?;
            let source = match (template, document_type) {
                (Some(path), _) => BulkSource::Template(path),
                (None, Some(document_type)) => BulkSource::Ai(document_type),
                (None, None) => anyhow::bail!("Either --template or --type is required"),
            };
            rt.block_on(docsmith::cli::commands::bulk::run(
                &config, &rows, source, output,
            ))?;
        }
        Commands::Providers { json, check } => {
            let config = load_config(config_path.as_deref())?;
            rt.block_on(docsmith::cli::commands::providers::run(&config, json, check))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                docsmith::cli::commands::config::show(json, config_path.as_deref())?
            }
            ConfigAction::Path => docsmith::cli::commands::config::path()?,
            ConfigAction::Init { global, force } => {
                docsmith::cli::commands::config::init(global, force)?
            }
        },
    }

    Ok(())
}
