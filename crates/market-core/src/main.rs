//! Torus Market Simulation
//!
//! Runs a consumer/supplier market on a torus and reports the final income
//! and revenue distributions.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use market_core::output::{write_snapshot, MarketSummary};
use market_core::{MarketConfig, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "market_sim")]
#[command(about = "Consumers and suppliers trading on a torus grid")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Number of consumers
    #[arg(long)]
    consumers: Option<u32>,

    /// Number of suppliers
    #[arg(long)]
    suppliers: Option<u32>,

    /// Grid width
    #[arg(long)]
    width: Option<u32>,

    /// Grid height
    #[arg(long)]
    height: Option<u32>,

    /// Write the final state as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    /// Command line values take precedence over the file
    fn into_config(self) -> anyhow::Result<(MarketConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => MarketConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => MarketConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if let Some(ticks) = self.ticks {
            config.simulation.ticks = ticks;
        }
        if let Some(consumers) = self.consumers {
            config.population.consumers = consumers;
        }
        if let Some(suppliers) = self.suppliers {
            config.population.suppliers = suppliers;
        }
        if let Some(width) = self.width {
            config.grid.width = width;
        }
        if let Some(height) = self.height {
            config.grid.height = height;
        }
        config.validate()?;
        Ok((config, self.output))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, output) = Args::parse().into_config()?;
    tracing::info!(
        seed = ?config.simulation.seed,
        ticks = config.simulation.ticks,
        "starting simulation"
    );

    let mut sim = Simulation::new(&config).context("building market")?;
    sim.run_ticks(config.simulation.ticks)
        .context("running market")?;

    let snapshot = sim.snapshot();
    let summary = MarketSummary::from_snapshot(&snapshot);
    for line in summary.to_string().lines() {
        tracing::info!("{}", line);
    }

    if let Some(path) = output {
        write_snapshot(&snapshot, &path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
