use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::color::ColorMap;
use crate::config::{Config, FilterOptions};
use crate::data::filter::{filter, split_by_regulation};
use crate::data::loader::{load_de_entities, load_predictions};
use crate::data::model::{normalize_id, DeEntity, Interaction, Prediction, Regulation, Side};
use crate::error::Result;
use crate::export::{self, SummaryRow};
use crate::network::{build, compute, NetworkMetrics};

// ---------------------------------------------------------------------------
// One network's results
// ---------------------------------------------------------------------------

/// A built network ready for export.
#[derive(Debug, Clone)]
pub struct NetworkResult {
    /// `"all"`, `"up"` or `"down"`.
    pub label: String,
    /// File-name prefix for the edge and node tables.
    pub prefix: String,
    pub edges: Vec<Interaction>,
    pub metrics: NetworkMetrics,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub networks: Vec<NetworkResult>,
    /// Paths written, in write order.
    pub written: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Build and measure one network from its edges.
pub fn analyse(
    label: &str,
    prefix: &str,
    edges: Vec<Interaction>,
    config: &Config,
) -> Result<NetworkResult> {
    if edges.is_empty() {
        warn!("EmptyResultWarning: network '{label}' has no edges; writing empty tables");
    }
    let graph = build(&edges)?;
    let metrics = compute(&graph, &config.metrics)?;
    info!(
        "network '{label}': {} miRNAs, {} targets, {} edges, {} components",
        metrics.summary.entity_count,
        metrics.summary.target_count,
        metrics.summary.edge_count,
        metrics.summary.component_count
    );
    Ok(NetworkResult {
        label: label.to_string(),
        prefix: prefix.to_string(),
        edges,
        metrics,
    })
}

/// Filter, optionally split by regulation, then build and measure each network.
pub fn build_networks(
    predictions: &[Prediction],
    de: &[DeEntity],
    config: &Config,
) -> Result<Vec<NetworkResult>> {
    // Sharing is counted per network, so defer it until after the split.
    let options = if config.split_regulation {
        FilterOptions {
            min_shared: 1,
            ..config.filter.clone()
        }
    } else {
        config.filter.clone()
    };

    let outcome = filter(predictions, de, &options)?;
    info!(
        "filter: {} rows read, {} matched DE miRNAs, {} below threshold, {} duplicates merged, {} unshared edges dropped",
        outcome.rows_read,
        outcome.rows_matched,
        outcome.rows_below_threshold,
        outcome.duplicates_merged,
        outcome.edges_unshared
    );
    if outcome.is_empty() {
        warn!("EmptyResultWarning: no prediction matched the DE list");
    }

    if config.split_regulation {
        let split = split_by_regulation(&outcome.edges, de, config.filter.min_shared);
        if split.unknown > 0 {
            warn!(
                "split: {} edges from miRNAs with unknown regulation excluded from both networks",
                split.unknown
            );
        }
        Ok(vec![
            analyse("up", Regulation::Up.prefix(), split.up, config)?,
            analyse("down", Regulation::Down.prefix(), split.down, config)?,
        ])
    } else {
        Ok(vec![analyse("all", "", outcome.edges, config)?])
    }
}

/// Table names this tool writes, across every prefix and extension.
fn known_outputs() -> Vec<String> {
    let mut names = Vec::new();
    for ext in ["csv", "tsv"] {
        for prefix in ["", Regulation::Up.prefix(), Regulation::Down.prefix()] {
            names.push(format!("{prefix}edges.{ext}"));
            names.push(format!("{prefix}nodes.{ext}"));
        }
        names.push(format!("summary.{ext}"));
    }
    names
}

/// Remove tables left by an earlier run in another mode (split vs. single,
/// comma vs. tab) so the directory only holds this run's output. Only the
/// file names this tool writes are touched.
fn remove_stale_outputs(dir: &Path, keep: &[PathBuf]) -> Result<()> {
    for name in known_outputs() {
        let path = dir.join(&name);
        if path.is_file() && !keep.contains(&path) {
            debug!("removing stale {}", path.display());
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Write every network's tables plus one shared summary.
///
/// Tables from an earlier run that this run does not rewrite are removed
/// first, e.g. `up_edges.csv` after switching split mode off.
pub fn export_networks(
    networks: &[NetworkResult],
    de: &[DeEntity],
    config: &Config,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&config.output_dir)?;
    let delimiter = config.delimiter_byte();
    let ext = config.output_extension();

    let mut regulation: HashMap<String, Regulation> = HashMap::with_capacity(de.len());
    for e in de {
        regulation.entry(normalize_id(&e.id)).or_insert(e.regulation);
    }
    let regulation_of = |id: &str| {
        regulation
            .get(&normalize_id(id))
            .copied()
            .unwrap_or(Regulation::Unknown)
    };

    let mut planned = Vec::with_capacity(networks.len() * 2 + 1);
    for net in networks {
        planned.push(config.output_dir.join(format!("{}edges.{ext}", net.prefix)));
        planned.push(config.output_dir.join(format!("{}nodes.{ext}", net.prefix)));
    }
    planned.push(config.output_dir.join(format!("summary.{ext}")));
    remove_stale_outputs(&config.output_dir, &planned)?;

    let mut written = Vec::new();
    for net in networks {
        let colors = ColorMap::new(
            net.metrics
                .nodes
                .iter()
                .filter(|n| n.side == Side::Entity)
                .map(|n| (n.id.as_str(), regulation_of(&n.id))),
        );

        let edges_path = config.output_dir.join(format!("{}edges.{ext}", net.prefix));
        export::write_edges(&edges_path, delimiter, &net.edges)?;
        written.push(edges_path);

        let nodes_path = config.output_dir.join(format!("{}nodes.{ext}", net.prefix));
        let rows = export::node_rows(&net.metrics.nodes, &colors, regulation_of);
        export::write_nodes(&nodes_path, delimiter, &rows)?;
        written.push(nodes_path);
    }

    let summary_path = config.output_dir.join(format!("summary.{ext}"));
    let rows: Vec<SummaryRow> = networks
        .iter()
        .map(|n| SummaryRow::new(&n.label, &n.metrics.summary))
        .collect();
    export::write_summary(&summary_path, delimiter, &rows)?;
    written.push(summary_path);

    Ok(written)
}

/// Run the whole pipeline: load → filter → build → metrics → export.
///
/// Nothing is written until every network has been computed, so a fatal
/// error leaves no partial output behind.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;

    let de = load_de_entities(&config.de_path, &config.de_schema)?;
    let predictions = load_predictions(&config.predictions_path, &config.prediction_schema)?;

    let networks = build_networks(&predictions, &de, config)?;
    let written = export_networks(&networks, &de, config)?;
    for path in &written {
        info!("wrote {}", path.display());
    }

    Ok(RunReport { networks, written })
}
