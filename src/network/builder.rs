use std::collections::{BTreeSet, HashSet};

use log::debug;

use super::BipartiteGraph;
use crate::data::model::{Interaction, Side};
use crate::error::{NetError, Result};

/// Build the bipartite graph from a deduplicated edge list.
///
/// Entities are added first (sorted), then targets (sorted), then edges in
/// input order. An id appearing on both sides, or a repeated pair, means the
/// filter was bypassed with malformed data and is reported as an invariant
/// violation; the 1-based position in `edges` is used as the row.
pub fn build(edges: &[Interaction]) -> Result<BipartiteGraph> {
    let sources: BTreeSet<&str> = edges.iter().map(|e| e.source.as_str()).collect();
    let targets: BTreeSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();

    if let Some((pos, e)) = edges
        .iter()
        .enumerate()
        .find(|(_, e)| sources.contains(e.target.as_str()))
    {
        return Err(NetError::InvariantViolation {
            row: pos + 1,
            source_id: e.source.clone(),
            target: e.target.clone(),
        });
    }

    let mut graph = BipartiteGraph::new();
    for id in &sources {
        graph.add_node(Side::Entity, id);
    }
    for id in &targets {
        graph.add_node(Side::Target, id);
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(edges.len());
    for (pos, e) in edges.iter().enumerate() {
        if !seen.insert((e.source.as_str(), e.target.as_str())) {
            return Err(NetError::InvariantViolation {
                row: pos + 1,
                source_id: e.source.clone(),
                target: e.target.clone(),
            });
        }
        // Both endpoints already exist; add_node only looks them up.
        let from = graph.add_node(Side::Entity, &e.source);
        let to = graph.add_node(Side::Target, &e.target);
        graph.add_edge(from, to, e.score);
    }

    debug!(
        "built graph: {} miRNAs, {} targets, {} edges",
        sources.len(),
        targets.len(),
        graph.edge_count()
    );
    Ok(graph)
}
