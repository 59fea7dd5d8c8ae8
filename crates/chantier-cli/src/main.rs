//! chantier: analyse the bids of a tender from the command line.
//!
//! Reads a CSV or JSON bid export, runs the offer analysis on every lot and
//! prints a Markdown report (or the raw analysis as JSON).

use anyhow::Context;
use chantier_common::{import, AnalysisConfig};
use chantier_offers::{
    analyze_all_offers, generate_offer_analysis_report, AnalysisOptions, OfferAnalysisResult,
};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "chantier", version, about = "Analyse tender offers per lot")]
struct Cli {
    /// Analysis configuration (TOML, YAML or JSON). Defaults to
    /// $CHANTIER_CONFIG, then ./chantier.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only analyse this lot id
    #[arg(long)]
    lot: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Bid export (.csv or .json)
    bids: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chantier=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let options = AnalysisOptions::from(&config);

    let bids = import::load_bids(&cli.bids)
        .with_context(|| format!("reading bids from {}", cli.bids.display()))?;

    let mut results = analyze_all_offers(&bids, &options);
    if let Some(lot) = &cli.lot {
        results = select_lot(results, lot);
        if results.is_empty() {
            warn!("Lot {lot} has no priced bid in {}", cli.bids.display());
        }
    }
    info!("Analysed {} lots from {} bids", results.len(), bids.len());

    println!("{}", render(&results, cli.format)?);
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<AnalysisConfig> {
    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => AnalysisConfig::load().context("loading configuration")?,
    };

    if !config.analysis.weights.sums_to_one() {
        warn!(
            "Scoring weights sum to {:.3} (price {}, conformity {}); using them as given",
            config.analysis.weights.price + config.analysis.weights.conformity,
            config.analysis.weights.price,
            config.analysis.weights.conformity
        );
    }
    info!(
        "Anomaly threshold {}%, {} lot estimates",
        config.analysis.anomaly_threshold,
        config.estimates.len()
    );
    Ok(config)
}

fn select_lot(
    mut results: BTreeMap<String, OfferAnalysisResult>,
    lot_id: &str,
) -> BTreeMap<String, OfferAnalysisResult> {
    match results.remove_entry(lot_id) {
        Some((key, result)) => BTreeMap::from([(key, result)]),
        None => BTreeMap::new(),
    }
}

fn render(
    results: &BTreeMap<String, OfferAnalysisResult>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_offer_analysis_report(results)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(results).context("serializing analysis results")
        }
    }
}
