//! CLI entry point for the automated report generator.

use anyhow::{anyhow, Result};
use autoreport::config::{ReportConfig, ReportLayout};
use autoreport::ingest::DataSource;
use autoreport::insight::{InsightProvider, SummaryNarrativeProvider};
use autoreport::pipeline::ReportPipeline;
use autoreport::summary::summarize;
use autoreport::types::ReportArtifacts;
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use polars::prelude::DataFrame;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "ai")]
use autoreport::insight::GroqProvider;
#[cfg(feature = "ai")]
use std::env;

/// CLI-compatible input format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliFormat {
    /// Comma-separated values
    Csv,
    /// JSON array of records (possibly nested)
    Json,
    /// SQLite database file (requires --query)
    Sqlite,
}

/// CLI-compatible output layout enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLayout {
    /// Text-only document plus graphs-only slide deck
    Split,
    /// Combined document and slide deck, each with all sections
    Combined,
}

impl From<CliLayout> for ReportLayout {
    fn from(cli: CliLayout) -> Self {
        match cli {
            CliLayout::Split => ReportLayout::Split,
            CliLayout::Combined => ReportLayout::Combined,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Automated data analysis report generator",
    long_about = "Generates a slide deck and a paper document from a tabular data source:\n\
                  descriptive statistics, charts, and an AI-written narrative.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GROQ_API_KEY    API key for Groq (falls back to an offline narrative when unset)\n\n\
                  EXAMPLES:\n  \
                  # CSV file, format inferred from the extension\n  \
                  autoreport -i sales.csv\n\n  \
                  # SQLite database\n  \
                  autoreport -i app.db --query \"SELECT * FROM orders\"\n\n  \
                  # Connection string instead of a file path\n  \
                  autoreport -c sqlite:///data/app.db --query \"SELECT * FROM orders\"\n\n  \
                  # Single combined report pair, no remote service\n  \
                  autoreport -i sales.csv --layout combined --no-ai"
)]
struct Args {
    /// Path to the input file (CSV, JSON, or SQLite database)
    #[arg(short, long, required_unless_present = "connection")]
    input: Option<String>,

    /// Database connection string (sqlite://... forms), instead of --input
    #[arg(short, long, conflicts_with = "input")]
    connection: Option<String>,

    /// Input format
    ///
    /// If not specified, inferred from the file extension
    #[arg(short, long, value_enum)]
    format: Option<CliFormat>,

    /// SQL query to run against a database source
    #[arg(short = 'Q', long)]
    query: Option<String>,

    /// Output directory for generated reports
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Dataset name used for the report subdirectory and file names
    ///
    /// If not specified, uses the input file stem
    #[arg(long)]
    name: Option<String>,

    /// Which pair of documents to produce
    #[arg(long, value_enum, default_value = "split")]
    layout: CliLayout,

    /// Fixed histogram bin count (automatic binning when omitted)
    #[arg(long)]
    bins: Option<usize>,

    /// Skip the correlation heatmap
    #[arg(long)]
    no_heatmap: bool,

    /// Disable the remote insight service (use the offline narrative)
    #[arg(long, default_value = "false")]
    no_ai: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the report artifacts as JSON to stdout
    ///
    /// Disables all progress logs; only outputs the final JSON.
    /// Useful for piping to other tools: `... --json | jq .written`
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    let (source, default_name) = resolve_source(&args)?;
    let dataset_name = args.name.clone().unwrap_or(default_name);

    info!("Loading dataset '{}'", dataset_name);
    let df = autoreport::ingest::ingest(&source)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let mut config_builder = ReportConfig::builder()
        .output_dir(&args.output)
        .layout(args.layout.into())
        .render_heatmap(!args.no_heatmap);
    if let Some(bins) = args.bins {
        config_builder = config_builder.histogram_bins(bins);
    }
    let config = config_builder.build()?;

    let provider = build_provider(&args, &df)?;
    let pipeline = ReportPipeline::builder()
        .config(config)
        .provider(provider)
        .build()?;

    match pipeline.run(&df, &dataset_name) {
        Ok(artifacts) => handle_output(&artifacts, &args),
        Err(e) => {
            error!("Report generation failed: {}", e);
            Err(anyhow!("Report generation failed: {}", e))
        }
    }
}

/// Turn the CLI arguments into a data source and a default dataset name.
fn resolve_source(args: &Args) -> Result<(DataSource, String)> {
    if let Some(ref connection) = args.connection {
        let query = args
            .query
            .clone()
            .ok_or_else(|| anyhow!("--query is required with --connection"))?;
        return Ok((
            DataSource::Sql {
                connection_string: connection.clone(),
                query,
            },
            "database".to_string(),
        ));
    }

    // required_unless_present guarantees input is set here
    let input = args.input.as_deref().expect("input or connection");
    let path = Path::new(input);
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    let format = match args.format {
        Some(format) => format,
        None => infer_format(path)?,
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    let source = match format {
        CliFormat::Csv => DataSource::Csv {
            bytes: std::fs::read(path)?,
        },
        CliFormat::Json => DataSource::Json {
            bytes: std::fs::read(path)?,
        },
        CliFormat::Sqlite => {
            let query = args
                .query
                .clone()
                .ok_or_else(|| anyhow!("--query is required for SQLite input"))?;
            DataSource::Sqlite {
                path: path.to_path_buf(),
                query,
            }
        }
    };

    Ok((source, name))
}

/// Infer the input format from the file extension.
fn infer_format(path: &Path) -> Result<CliFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(CliFormat::Csv),
        "json" => Ok(CliFormat::Json),
        "db" | "sqlite" | "sqlite3" => Ok(CliFormat::Sqlite),
        _ => Err(anyhow!(
            "Cannot infer format from '{}'; pass --format explicitly",
            path.display()
        )),
    }
}

/// Build the insight provider with optional AI support.
#[cfg(feature = "ai")]
fn build_provider(args: &Args, df: &DataFrame) -> Result<Arc<dyn InsightProvider>> {
    if args.no_ai {
        info!("Remote insights disabled; using the offline narrative");
        return offline_provider(df);
    }

    match env::var("GROQ_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!("Using Groq for insight generation");
            Ok(Arc::new(GroqProvider::new(key)?))
        }
        _ => {
            warn!("GROQ_API_KEY not set. Falling back to the offline narrative.");
            offline_provider(df)
        }
    }
}

/// Build the insight provider (fallback when the "ai" feature is disabled).
#[cfg(not(feature = "ai"))]
fn build_provider(args: &Args, df: &DataFrame) -> Result<Arc<dyn InsightProvider>> {
    if !args.no_ai {
        warn!("AI support not compiled in. Using the offline narrative.");
        warn!("Compile with --features ai to enable it.");
    }
    offline_provider(df)
}

/// The offline narrative needs the summary up front; it is recomputed
/// inside the pipeline as well, which is cheap relative to chart rendering.
fn offline_provider(df: &DataFrame) -> Result<Arc<dyn InsightProvider>> {
    let summary = summarize(df)?;
    Ok(Arc::new(SummaryNarrativeProvider::new(summary)))
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the artifacts as JSON to stdout only (no logs)
fn handle_output(artifacts: &ReportArtifacts, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(artifacts)?);
        return Ok(());
    }

    // Intentionally println!: this is the primary CLI result, shown
    // regardless of log level.
    println!("\n{}", "=".repeat(60));
    println!("Report generated for '{}'", artifacts.dataset_name);
    println!("{}", "=".repeat(60));
    println!(
        "  Rows: {}  Columns: {}  Charts: {}",
        artifacts.summary.row_count,
        artifacts.summary.column_count,
        artifacts.charts.len()
    );
    for path in &artifacts.written {
        println!("  - {}", path.display());
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
