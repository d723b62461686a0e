//! shipgen - synthetic logistics dataset generator
//!
//! Generates SKU/location master data, shipment lifecycles with delay
//! causes, and weekly sales/inventory from one seed, then writes them as
//! CSV files plus a JSON run summary.
//!
//! Module structure:
//! - `domain/` - Records and enums (Sku, Location, Shipment, Sales, Inventory)
//! - `services/` - Generation (draw service, calendar, master data, simulator)
//! - `infra/` - Infrastructure (Config, RunStats)
//! - `io/` - Dataset writer

use anyhow::Context;
use clap::Parser;
use shipgen::infra::config::DEFAULT_CONFIG_PATH;
use shipgen::infra::{Config, RunStats};
use shipgen::io::DatasetWriter;
use shipgen::services::generate;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Synthetic logistics dataset generator
#[derive(Parser, Debug)]
#[command(name = "shipgen", version, about)]
struct Args {
    /// Path to TOML configuration file (default: config/default.toml if
    /// present, else built-in defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the run seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the output directory
    #[arg(long)]
    out_dir: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Structured logging, level via RUST_LOG (default: info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let logger = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false);
    if args.json_logs {
        logger.json().init();
    } else {
        logger.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), git_hash = env!("GIT_HASH"), "shipgen_starting");

    // An explicit path must exist; bad values are never replaced by defaults
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_from_path(DEFAULT_CONFIG_PATH)?,
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(dir) = args.out_dir {
        config = config.with_output_dir(dir);
    }

    info!(
        config_file = %config.config_file(),
        seed = %config.seed(),
        start_date = %config.start_date(),
        months = %config.months(),
        n_skus = %config.n_skus(),
        n_stores = %config.n_stores(),
        shipments_per_day = %config.shipments_per_day(),
        f2w_probability = %config.f2w_probability(),
        promo_weeks_ratio = %config.promo_weeks_ratio(),
        output_dir = %config.output_dir().display(),
        "config_loaded"
    );

    config.validate().context("configuration rejected")?;

    let settings = config.generation_settings();
    let datasets = generate(&settings).context("generation aborted")?;

    let stats = RunStats::from_datasets(settings.seed, &datasets);
    DatasetWriter::new(config.output_dir())
        .write_all(&datasets, &stats)
        .with_context(|| format!("failed to write datasets to {}", config.output_dir().display()))?;

    stats.log();
    info!("shipgen complete");
    Ok(())
}
