use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use pagetext_core::config_file::{self, ConfigFile};
use pagetext_core::{ExtractConfig, ExtractConfigBuilder, Extractor, PdfBackend};
use pagetext_pdf_mupdf::MupdfBackend;
use tracing_subscriber::EnvFilter;

mod output;

use output::{ColorMode, PageProgress};

/// Extract the text of a PDF's leading pages into a page-marked text file
#[derive(Parser, Debug)]
#[command(name = "pagetext", version, about, long_about = None)]
struct Cli {
    /// Path to the PDF to extract
    source: PathBuf,

    /// Output file [default: <source stem>_content.txt]
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Maximum number of leading pages to extract [default: 50]
    #[arg(short = 'n', long = "pages")]
    pages: Option<usize>,

    /// Print the extracted text to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Drop text blocks in this top fraction of each page (0.0–1.0)
    #[arg(long, value_parser = parse_ratio)]
    header_exclusion: Option<f32>,

    /// Drop text blocks starting in this bottom fraction of each page (0.0–1.0)
    #[arg(long, value_parser = parse_ratio)]
    footer_exclusion: Option<f32>,

    /// Path to a TOML config file (replaces the default config lookup)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_ratio(s: &str) -> Result<f32, String> {
    let ratio: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if config_file::ratio_in_range(ratio) {
        Ok(ratio)
    } else {
        Err(format!("{ratio} is not in the range 0.0 to 1.0"))
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `PAGETEXT_PAGE_LIMIT`, if set to a valid number.
fn env_page_limit() -> Option<usize> {
    let value = std::env::var("PAGETEXT_PAGE_LIMIT").ok()?;
    match value.trim().parse() {
        Ok(limit) => Some(limit),
        Err(_) => {
            tracing::warn!(value = %value, "ignoring invalid PAGETEXT_PAGE_LIMIT");
            None
        }
    }
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(
    cli: &Cli,
    file: &ConfigFile,
    env_limit: Option<usize>,
) -> anyhow::Result<ExtractConfig> {
    let mut builder = ExtractConfigBuilder::new()
        .source(&cli.source)
        .maybe_page_limit(file.page_limit())
        .maybe_page_limit(env_limit)
        .maybe_page_limit(cli.pages);
    if let Some(dir) = file.output_dir() {
        builder = builder.output_dir(dir);
    }
    if let Some(ref output) = cli.output {
        builder = builder.destination(output);
    }
    Ok(builder.build()?)
}

fn build_backend(cli: &Cli, file: &ConfigFile) -> MupdfBackend {
    let header = cli
        .header_exclusion
        .or_else(|| file.header_exclusion())
        .unwrap_or(0.0);
    let footer = cli
        .footer_exclusion
        .or_else(|| file.footer_exclusion())
        .unwrap_or(0.0);
    MupdfBackend::new()
        .with_header_exclusion(header)
        .with_footer_exclusion(footer)
}

/// Run one extraction and report to `out` (summary) or stream the text to
/// `out` with the summary on `err` when `--stdout` is set.
fn execute(
    cli: &Cli,
    config: &ExtractConfig,
    backend: &dyn PdfBackend,
    progress: &PageProgress,
    out: &mut dyn Write,
    err: &mut dyn Write,
    color: ColorMode,
) -> anyhow::Result<()> {
    let extractor = Extractor::new(backend).with_progress(|event| progress.handle(event));

    if cli.stdout {
        let extraction = extractor.extract_path(&config.source_path, config.page_limit)?;
        progress.finish();
        out.write_all(extraction.render().as_bytes())?;
        out.flush()?;
        output::print_stdout_summary(
            err,
            extraction.pages.len(),
            extraction.total_pages,
            &extraction.failed_pages(),
            color,
        )?;
    } else {
        let result = extractor.run(config);
        progress.finish();
        let report = result?;
        output::print_summary(out, &report, color)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = match cli.config {
        Some(ref path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };
    let config = resolve_config(&cli, &file_config, env_page_limit())?;
    let backend = build_backend(&cli, &file_config);
    tracing::debug!(?config, "resolved configuration");

    let stderr_tty = std::io::stderr().is_terminal();
    let progress = if cli.no_progress || cli.verbose > 0 || !stderr_tty {
        PageProgress::hidden()
    } else {
        PageProgress::new()
    };
    // Colour goes on whichever stream carries the summary.
    let summary_tty = if cli.stdout {
        stderr_tty
    } else {
        std::io::stdout().is_terminal()
    };
    let color = ColorMode(!cli.no_color && summary_tty);

    execute(
        &cli,
        &config,
        &backend,
        &progress,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
        color,
    )
}
