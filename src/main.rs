//! ISIN -> ticker map generator.
//!
//! Downloads (or reads) the broker's instrument listing PDF, extracts every
//! `market ISIN ticker` row and writes the resulting map as a TypeScript
//! module or JSON file.
//!
//! Usage: isin-ticker-map [--source URL|PATH] [--output PATH] [--format ts|json]
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (configuration, download, extraction, write)

use anyhow::{Context, Result};
use clap::Parser;
use isin_ticker_map::{
    export, extract_pdf, CliOverrides, Config, OutputFormat, Source, UnknownMarketPolicy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build an ISIN -> ticker map from a broker instrument listing
#[derive(Parser, Debug)]
#[command(name = "isin-ticker-map")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (JSON format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listing URL or local PDF path
    #[arg(short, long, env = "ISIN_MAP_SOURCE")]
    source: Option<String>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Name of the exported constant in TypeScript output
    #[arg(long)]
    variable_name: Option<String>,

    /// Skip rows with unknown market identifiers instead of failing
    #[arg(long)]
    skip_unknown: bool,

    /// Print the result to stdout instead of writing the output file
    #[arg(long)]
    stdout: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ISIN_MAP_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            source: self.source.clone(),
            output: self.output.clone(),
            format: self.format,
            variable_name: self.variable_name.clone(),
            skip_unknown: self.skip_unknown,
            log_level: self.log_level.clone(),
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let base = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = base.with_overrides(args.overrides())?;
    config.validate()?;
    Ok(config)
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    init_tracing(config.log_level.as_filter_str());

    tracing::info!("isin-ticker-map v{}", isin_ticker_map::VERSION);
    tracing::info!(
        source = %config.source,
        output = %config.output.display(),
        format = config.format.as_str(),
        on_unknown_market = ?config.on_unknown_market,
        "Configuration loaded"
    );

    let source = Source::parse(&config.source);
    let bytes = source
        .load()
        .await
        .with_context(|| format!("Failed to load listing from {}", source))?;

    let registry = config.registry();
    let extraction = extract_pdf(&bytes, &registry, config.on_unknown_market)
        .with_context(|| format!("Failed to extract listing from {}", source))?;

    let pages = extraction.pages;
    let records = extraction.records.len();
    let skipped = extraction.skipped.len();
    let map = extraction.into_map();

    tracing::info!(
        pages,
        records,
        unique_isins = map.len(),
        collisions = map.collisions(),
        skipped,
        "Listing extracted"
    );
    if skipped > 0 && config.on_unknown_market == UnknownMarketPolicy::Skip {
        tracing::warn!(skipped, "Rows with unknown markets were left out of the map");
    }

    if args.stdout {
        print!(
            "{}",
            export::render(&map, config.format, &config.variable_name)?
        );
    } else {
        export::write_output(&config.output, &map, config.format, &config.variable_name)
            .context("Failed to write output")?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
