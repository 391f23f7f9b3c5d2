use anyhow::Result;
use clap::{Parser, Subcommand};
use literature_review::config::{
    file_config::write_default_config, find_config_file, load_config, Config, API_KEY_ENV,
};
use literature_review::models::ExtractedText;
use literature_review::pipeline::{
    BatchCoordinator, CitationResolver, DoiResolver, RunError, RunOptions,
};
use literature_review::print_status;
use literature_review::sources::{CrossRefSource, GeminiBackend};
use literature_review::ui;
use literature_review::utils::{ErrorLog, PdfTextExtractor, TextExtractor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Literature Review - Summarize a folder of papers into a cited literature review
#[derive(Parser, Debug)]
#[command(name = "literature-review")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize a folder of PDF papers into a cited literature review", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize every PDF in the input folder (default)
    Run {
        /// Folder containing the PDFs
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Citation style (APA, MLA, IEEE)
        #[arg(long, short)]
        style: Option<String>,

        /// Maximum number of documents processed at once
        #[arg(long, short)]
        workers: Option<usize>,

        /// Skip generating the structured review
        #[arg(long)]
        no_review: bool,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write the file
        #[arg(default_value = "literature-review.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Print the citation for a single PDF
    Cite {
        /// PDF file
        file: PathBuf,

        /// Citation style (APA, MLA, IEEE)
        #[arg(long, short)]
        style: Option<String>,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Literature Review - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  GEMINI_API_KEY                          API key for the Gemini text generation service");
    println!();
    println!("Configuration Overrides (section__key):");
    println!("  LIT_REVIEW__INPUT__FOLDER               Folder scanned for PDFs (default: papers)");
    println!("  LIT_REVIEW__INPUT__EXTENSION            Document extension (default: pdf)");
    println!("  LIT_REVIEW__EXTRACTION__MAX_PAGES       Pages read per document (default: 20)");
    println!("  LIT_REVIEW__EXTRACTION__MAX_CHARS       Characters kept per document (default: 10000)");
    println!("  LIT_REVIEW__GENERATION__MODEL           Gemini model (default: gemini-1.5-flash)");
    println!("  LIT_REVIEW__GENERATION__MAX_ATTEMPTS    Attempts per generation call (default: 3)");
    println!("  LIT_REVIEW__GENERATION__BACKOFF_UNIT_MS Backoff unit in milliseconds (default: 1000)");
    println!("  LIT_REVIEW__METADATA__MAILTO            Contact address for CrossRef's polite pool");
    println!("  LIT_REVIEW__CITATION__DEFAULT_STYLE     Style when none is given (default: IEEE)");
    println!("  LIT_REVIEW__CITATION__FALLBACK_STYLE    Style for unrecognized input (default: APA)");
    println!("  LIT_REVIEW__OUTPUT__SUMMARY_FILE        Summary file (default: literature_review.txt)");
    println!("  LIT_REVIEW__OUTPUT__REVIEW_FILE         Review file (default: full_literature_review.txt)");
    println!("  LIT_REVIEW__OUTPUT__LOG_FILE            Error log (default: log.txt)");
    println!("  LIT_REVIEW__CONCURRENCY__MAX_WORKERS    Documents processed at once (default: CPU count)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                                Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export GEMINI_API_KEY=\"your-key-here\"");
    println!("  export LIT_REVIEW__INPUT__FOLDER=\"./corpus\"");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("literature_review={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }
    let mut config = load_config(config_path.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Run {
        input: None,
        style: None,
        workers: None,
        no_review: false,
    });

    match command {
        Commands::Run {
            input,
            style,
            workers,
            no_review,
        } => {
            if let Some(input) = input {
                config.input.folder = input;
            }
            if workers.is_some() {
                config.concurrency.max_workers = workers;
            }

            let (style, notice) = config.citation.resolve(style.as_deref());
            if let Some(notice) = notice {
                println!("{}", notice);
            }

            if config.generation.api_key.is_none() {
                print_status!(
                    ui::Status::Warning,
                    format!("{} is not set; generation calls will fail", API_KEY_ENV)
                );
            }

            if !cli.quiet && ui::is_terminal() {
                ui::print_banner();
            }

            let backend = gemini_backend(&config)?;
            tracing::debug!("Generating with model {}", backend.model());

            let coordinator = BatchCoordinator::new(
                config.clone(),
                style,
                Arc::new(PdfTextExtractor::new()),
                Arc::new(backend),
                Arc::new(crossref_source(&config)?),
            );

            let options = RunOptions {
                generate_review: !no_review,
                quiet: cli.quiet,
            };

            match coordinator.run(options).await {
                Ok(report) => {
                    tracing::info!(
                        "Processed {} of {} documents ({} skipped, {} without a summary)",
                        report.processed,
                        report.discovered,
                        report.skipped,
                        report.summary_failures
                    );
                }
                Err(e @ RunError::MissingFolder(_)) => {
                    println!("Error: {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::InitConfig { path, force } => {
            write_default_config(&path, force)?;
            print_status!(
                ui::Status::Success,
                format!("Wrote default configuration to {}", path.display())
            );
        }

        Commands::Cite { file, style } => {
            let (style, notice) = config.citation.resolve(style.as_deref());
            if let Some(notice) = notice {
                println!("{}", notice);
            }

            let max_pages = config.extraction.max_pages;
            let path = file.clone();
            let raw = tokio::task::spawn_blocking(move || {
                PdfTextExtractor::new().extract(&path, max_pages)
            })
            .await??;
            let text = ExtractedText::bounded(&raw, config.extraction.max_chars);

            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let resolver = CitationResolver::new(
                DoiResolver::new(Arc::new(crossref_source(&config)?)),
                style,
            );
            let citation = resolver
                .resolve(text.as_str(), &file_name, 1, &ErrorLog::discard())
                .await;

            ui::print_section(&format!("{} ({:?})", file_name, citation.source));
            println!("In-text:      {}", citation.in_text);
            println!("Bibliography: {}", citation.bibliography);
        }
    }

    Ok(())
}

fn gemini_backend(config: &Config) -> Result<GeminiBackend> {
    let generation = &config.generation;
    Ok(GeminiBackend::new(
        &generation.base_url,
        &generation.model,
        generation.api_key.as_deref().unwrap_or_default(),
        Duration::from_secs(generation.timeout_secs),
    )?)
}

fn crossref_source(config: &Config) -> Result<CrossRefSource> {
    let metadata = &config.metadata;
    Ok(CrossRefSource::new(
        metadata.base_url.clone(),
        metadata.mailto.as_deref(),
        Duration::from_secs(metadata.timeout_secs),
    )?)
}
