//! Bridge Claim Reconciler
//!
//! Reads a batch of bridging claims, verifies each one against indexed on-chain
//! transfers, and writes every verdict to `all-results-<millis>.csv` plus the valid
//! ones to `valid-results-<millis>.csv`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin reconcile-claims -- --config config/reconciler.toml
//! ```
//!
//! The API key may also be supplied via `AIRSTACK_API_KEY`, either exported or in a
//! `.env` file.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use bridge_claim_reconciler::{
    claims::load_claims, sink::ResultFiles, AirstackClient, BatchRunner, ClaimValidator, Config,
};

#[derive(Parser, Debug)]
#[command(name = "reconcile-claims")]
#[command(about = "Reconciles cross-chain bridging claims against on-chain transfers")]
struct Args {
    /// Path to configuration file (default: config/reconciler.toml or RECONCILER_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Claim file to process (overrides io.claims_path)
    #[arg(long)]
    claims: Option<String>,

    /// Directory for result files (overrides io.results_dir)
    #[arg(long)]
    results_dir: Option<String>,

    /// Maximum seconds between send and receive timestamps (overrides reconciler.timestamp_delta_secs)
    #[arg(long)]
    timestamp_delta: Option<u64>,
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    info!("Starting claim reconciliation");

    Config::load_env_file(None)?;
    let mut config = Config::load_from_path(args.config.as_deref())?;
    if let Some(claims) = args.claims {
        config.io.claims_path = claims;
    }
    if let Some(results_dir) = args.results_dir {
        config.io.results_dir = results_dir;
    }
    if let Some(delta) = args.timestamp_delta {
        config.reconciler.timestamp_delta_secs = delta;
    }
    config.validate()?;
    info!("Configuration loaded successfully");
    info!(
        "Send leg: {} ({}), receive leg: {} ({}), timestamp delta: {}s",
        config.send_leg.label,
        config.send_leg.blockchain,
        config.receive_leg.label,
        config.receive_leg.blockchain,
        config.reconciler.timestamp_delta_secs
    );

    let claims = load_claims(&config.io.claims_path)?;

    let lookup = Arc::new(
        AirstackClient::from_config(&config.lookup).context("Failed to create transfer lookup")?,
    );
    let runner = BatchRunner::new(ClaimValidator::new(&config, lookup));

    let mut files = ResultFiles::create_in(&config.io.results_dir)?;
    let (_, summary) = runner
        .run(&claims, &mut files.all, &mut files.valid_only)
        .await;

    info!(
        "Done: {} claim(s), {} valid, {} invalid, {} failed",
        summary.total, summary.valid, summary.invalid, summary.failed
    );

    Ok(())
}
