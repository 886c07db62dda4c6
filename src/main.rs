mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let start = std::time::Instant::now();

    let config = Args::parse().into_config()?;
    let report = mirna_net::run(&config).with_context(|| {
        format!(
            "building network from {} and {}",
            config.de_path.display(),
            config.predictions_path.display()
        )
    })?;

    for net in &report.networks {
        info!(
            "{}: {} nodes, {} edges, density {}",
            net.label,
            net.metrics.summary.node_count,
            net.metrics.summary.edge_count,
            net.metrics.summary.density
        );
    }
    info!("Elapsed time: {:?}", start.elapsed());
    Ok(())
}
