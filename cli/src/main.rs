// src/main.rs
//
// Command-line entrypoint for the partnership simulator.
//
// - Brands come from a JSON array of brand records (--brands).
// - Config is optional JSON; every field has a default. Flags override it.
// - Products: --products JSON if given, else the built-in portfolio.
// - Prints the batch summary (or the comparison) as JSON on stdout.
//   Logs go to stderr, filtered by RUST_LOG.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;

use partnership_simulator_core_rs::models::{BrandRecord, PartnershipModel, Product};
use partnership_simulator_core_rs::orchestrator::{BatchSummary, MonteCarloRunner, RunFailure, SimulationConfig};
use partnership_simulator_core_rs::Catalog;

#[derive(Copy, Clone, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum ModelArg {
    CoBranded,
    WhiteLabel,
    Both,
}

#[derive(Debug, Parser)]
#[command(
    name = "partnership-simulator",
    about = "Monte Carlo comparison of co-branded and white-label partnerships",
    version
)]
struct Args {
    /// JSON array of brand records.
    #[arg(long)]
    brands: PathBuf,

    /// JSON simulation config (missing fields take defaults).
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of products (defaults to the built-in portfolio).
    #[arg(long)]
    products: Option<PathBuf>,

    /// Number of trials per model.
    #[arg(long)]
    simulations: Option<usize>,

    /// Base random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Model to simulate.
    #[arg(long, value_enum, default_value_t = ModelArg::Both)]
    model: ModelArg,

    /// Geography scenario key (eu_production, asian_production, hybrid_model).
    #[arg(long)]
    scenario: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    summary: &'a BatchSummary,
    failures: &'a [RunFailure],
}

#[derive(Serialize)]
struct ComparisonOutput<'a> {
    co_branded: BatchOutput<'a>,
    white_label: BatchOutput<'a>,
    npv_profit_difference: f64,
    recommended: PartnershipModel,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {} file: {}", what, path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("partnership_simulator=info,sim=info")),
        )
        .init();

    let args = Args::parse();

    let records: Vec<BrandRecord> = read_json(&args.brands, "brands")?;
    let products: Vec<Product> = match &args.products {
        Some(path) => read_json(path, "products")?,
        None => Product::default_portfolio(),
    };
    let mut config: SimulationConfig = match &args.config {
        Some(path) => read_json(path, "config")?,
        None => SimulationConfig::default(),
    };

    if let Some(n) = args.simulations {
        config.n_simulations = n;
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if let Some(scenario) = args.scenario {
        config.geography_scenario = scenario;
    }
    match args.model {
        ModelArg::CoBranded => config.model_type = PartnershipModel::CoBranded,
        ModelArg::WhiteLabel => config.model_type = PartnershipModel::WhiteLabel,
        ModelArg::Both => {}
    }

    let catalog = Catalog::new(products, records).context("Invalid catalog")?;
    if !catalog.substitutions().is_empty() {
        tracing::info!(
            substitutions = catalog.substitutions().len(),
            "Brand metrics filled from segment data"
        );
    }
    let runner = MonteCarloRunner::new(&catalog, config).context("Invalid configuration")?;

    let json = match args.model {
        ModelArg::Both => {
            let comparison = runner.compare();
            let output = ComparisonOutput {
                co_branded: BatchOutput {
                    summary: &comparison.co_branded.summary,
                    failures: &comparison.co_branded.failures,
                },
                white_label: BatchOutput {
                    summary: &comparison.white_label.summary,
                    failures: &comparison.white_label.failures,
                },
                npv_profit_difference: comparison.npv_profit_difference,
                recommended: comparison.recommended,
            };
            to_json(&output, args.pretty)?
        }
        _ => {
            let batch = runner.run_configured();
            let output = BatchOutput {
                summary: &batch.summary,
                failures: &batch.failures,
            };
            to_json(&output, args.pretty)?
        }
    };

    println!("{json}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}
