// src/bin/tokensim.rs

//! Runs the standard token economy headless and reports how it went.
//!
//! `RUST_LOG=debug` shows every agent action.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use token_economy_sim::{
    SimResult, SimStrategy, SnapshotWriter, TickSnapshot, build_sustainability_loop, snapshot::write_kpis_json,
    wallet::format_wallet,
};

/// Token economy simulation
#[derive(Parser, Debug)]
#[command(name = "tokensim")]
#[command(about = "Multi-agent simulation of a token economy")]
#[command(version)]
struct Args {
    /// JSON strategy file; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Total ticks to run
    #[arg(long, env = "SIM_TICKS")]
    ticks: Option<u64>,

    /// RNG seed
    #[arg(long, env = "SIM_SEED")]
    seed: Option<u64>,

    /// Write one JSON snapshot per tick to this file
    #[arg(long)]
    snapshots: Option<PathBuf>,

    /// Write the KPI series to this file when the run ends
    #[arg(long)]
    kpis: Option<PathBuf>,

    /// Add publishers, speculators and data consumers
    #[arg(long)]
    with_data_ecosystem: bool,
}

fn main() -> SimResult<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut strategy = match &args.config {
        Some(path) => SimStrategy::from_json_file(path)?,
        None => SimStrategy::default(),
    };
    if let Some(ticks) = args.ticks {
        strategy.max_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        strategy.seed = seed;
    }
    strategy.with_data_ecosystem |= args.with_data_ecosystem;
    strategy.validate()?;

    let mut state = build_sustainability_loop(strategy)?;

    match &args.snapshots {
        Some(path) => {
            let mut writer = SnapshotWriter::create(path)?;
            state.run_with(|s| writer.write(&TickSnapshot::capture(s)?))?;
            let written = writer.written();
            writer.finish()?;
            info!(path = %path.display(), written, "snapshots written");
        }
        None => state.run()?,
    }

    if let Some(path) = &args.kpis {
        write_kpis_json(path, state.kpis())?;
        info!(path = %path.display(), "kpis written");
    }

    println!("ticks:            {}", state.current_tick());
    println!("token price:      ${:.4}", state.token_price()?);
    println!("token supply:     {:.0}", state.token_supply());
    println!("minted / burned:  {:.0} / {:.0}", state.total_minted(), state.total_burned());
    println!("pools (rugged):   {} ({})", state.num_pools(), state.rugged_pools().len());
    if let Some(summary) = state.kpis().summary() {
        println!(
            "price mean/sd:    {:.4} / {:.4}  [{:.4}, {:.4}]",
            summary.mean, summary.std_dev, summary.min, summary.max
        );
    }
    for agent in state.agents() {
        println!("{:<24} {}", agent.name(), format_wallet(agent.wallet()));
    }
    Ok(())
}
