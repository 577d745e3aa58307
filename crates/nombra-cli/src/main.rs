use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nombra_core::config_file::{self, ConfigFile};
use nombra_core::{Config, OpenAiClient, pipeline};
use nombra_ocr::OcrBackend;
use nombra_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Generate titles for PDF documents using AI and rename them accordingly
#[derive(Parser, Debug)]
#[command(
    name = "nombra",
    version,
    about,
    long_about = "Analyzes PDF content (text layer, or OCR for scanned documents) and asks an \
OpenAI-compatible model for a descriptive title, then renames the file to it.",
    after_help = "Examples:\n  nombra myfile.pdf\n  nombra myfile.pdf --model gpt-4-turbo"
)]
struct Cli {
    /// Path to the PDF file to rename
    file_path: PathBuf,

    /// OpenAI API key (default: $OPENAI_API_KEY)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Force OCR text extraction
    #[arg(short, long)]
    ocr: bool,

    /// Model to use (default: gpt-3.5-turbo)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum content length sent for title generation (default: 3000)
    #[arg(short = 'l', long)]
    max_content_length: Option<usize>,

    /// Minimum content length required for processing (default: 10)
    #[arg(short = 'n', long)]
    min_content_length: Option<usize>,

    /// Base URL of an OpenAI-compatible API (default: $OPENAI_BASE_URL or https://api.openai.com/v1)
    #[arg(long)]
    base_url: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = resolve_config(&cli, &config_file::load_config(), |key| {
        std::env::var(key).ok()
    });
    config.validate()?;
    tracing::debug!(?config, "resolved configuration");

    if !cli.file_path.exists() {
        anyhow::bail!("File not found: {}", cli.file_path.display());
    }

    let standard = MupdfBackend::new();
    let ocr = OcrBackend::new()
        .with_dpi(config.ocr_dpi)
        .with_language(config.ocr_language.clone());
    let generator = OpenAiClient::new(&config.api_key, &config.api_base_url, &config.model)
        .context("could not set up the API client")?;

    let outcome = pipeline::run(&cli.file_path, &config, &standard, &ocr, &generator).await?;

    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());
    let mut stdout = std::io::stdout().lock();
    output::print_title(&mut stdout, &outcome.title, color)?;
    output::print_rename(&mut stdout, &outcome.rename, color)?;

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--verbose` picks debug for
/// this workspace's crates and info without it.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default = format!(
        "warn,nombra={level},nombra_core={level},nombra_ocr={level},nombra_pdf_mupdf={level}"
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(
    cli: &Cli,
    file: &ConfigFile,
    env: impl Fn(&str) -> Option<String>,
) -> Config {
    let defaults = Config::default();
    let openai = file.openai.clone().unwrap_or_default();
    let content = file.content.clone().unwrap_or_default();
    let ocr = file.ocr.clone().unwrap_or_default();

    Config {
        api_key: cli
            .key
            .clone()
            .or_else(|| env("OPENAI_API_KEY"))
            .or(openai.api_key)
            .unwrap_or_default(),
        api_base_url: cli
            .base_url
            .clone()
            .or_else(|| env("OPENAI_BASE_URL"))
            .or(openai.base_url)
            .unwrap_or(defaults.api_base_url),
        model: cli
            .model
            .clone()
            .or_else(|| env("NOMBRA_MODEL"))
            .or(openai.model)
            .unwrap_or(defaults.model),
        max_content_length: cli
            .max_content_length
            .or(content.max_length)
            .unwrap_or(defaults.max_content_length),
        min_content_length: cli
            .min_content_length
            .or(content.min_length)
            .unwrap_or(defaults.min_content_length),
        force_ocr: cli.ocr || ocr.force.unwrap_or(false),
        verbose: cli.verbose,
        ocr_dpi: ocr.dpi.unwrap_or(defaults.ocr_dpi),
        ocr_language: ocr.language,
    }
}
