//! Node-level and graph-level metrics.
//!
//! Fallbacks on degenerate graphs:
//! * `degree_centrality` is NaN when the graph has fewer than two nodes.
//! * betweenness is 0.0 for every node when the graph has at most two nodes.
//! * `density` is NaN when either side of the graph is empty.
//! * an empty graph yields no node rows and `component_count == 0`.

use std::collections::{HashMap, VecDeque};

use log::debug;
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;

use super::BipartiteGraph;
use crate::config::{CentralityMeasure, MetricsOptions};
use crate::data::filter::sharing_category;
use crate::data::model::Side;
use crate::error::{NetError, Result};

const EIGENVECTOR_MAX_ITER: usize = 100;
const EIGENVECTOR_TOL: f64 = 1e-6;

/// Per-node statistics, in graph node order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetrics {
    pub id: String,
    pub side: Side,
    /// Out-degree for miRNAs, in-degree for targets.
    pub degree: usize,
    /// `degree / (n - 1)`.
    pub degree_centrality: f64,
    /// Value of the configured global centrality measure.
    pub centrality: f64,
    pub component: usize,
    /// Distinct miRNAs regulating a target; 0 for miRNAs.
    pub shared_by: usize,
    pub category: &'static str,
}

/// Whole-graph statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummary {
    pub node_count: usize,
    pub entity_count: usize,
    pub target_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub component_count: usize,
    pub centrality_measure: CentralityMeasure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkMetrics {
    pub nodes: Vec<NodeMetrics>,
    pub summary: GraphSummary,
}

/// Compute all metrics over an immutable graph.
pub fn compute(graph: &BipartiteGraph, options: &MetricsOptions) -> Result<NetworkMetrics> {
    let n = graph.node_count();
    let entity_count = graph.count_side(Side::Entity);
    let target_count = graph.count_side(Side::Target);

    let centrality = match options.centrality {
        CentralityMeasure::Betweenness => betweenness(graph),
        CentralityMeasure::Eigenvector => eigenvector(graph)?,
    };
    let (components, component_count) = components(graph);

    let nodes = graph
        .inner()
        .node_indices()
        .map(|idx| {
            let node = &graph.inner()[idx];
            let degree = graph.degree(idx);
            let shared_by = match node.side {
                Side::Entity => 0,
                Side::Target => degree,
            };
            NodeMetrics {
                id: node.id.clone(),
                side: node.side,
                degree,
                degree_centrality: if n > 1 {
                    degree as f64 / (n - 1) as f64
                } else {
                    f64::NAN
                },
                centrality: centrality[idx.index()],
                component: components[idx.index()],
                shared_by,
                category: sharing_category(shared_by),
            }
        })
        .collect();

    let possible = entity_count * target_count;
    let density = if possible == 0 {
        f64::NAN
    } else {
        graph.edge_count() as f64 / possible as f64
    };

    let summary = GraphSummary {
        node_count: n,
        entity_count,
        target_count,
        edge_count: graph.edge_count(),
        density,
        component_count,
        centrality_measure: options.centrality,
    };
    debug!("metrics: {summary:?}");

    Ok(NetworkMetrics { nodes, summary })
}

/// Undirected adjacency lists indexed by node index.
fn adjacency(graph: &BipartiteGraph) -> Vec<Vec<usize>> {
    graph
        .inner()
        .node_indices()
        .map(|idx| {
            graph
                .undirected_neighbors(idx)
                .into_iter()
                .map(NodeIndex::index)
                .collect()
        })
        .collect()
}

/// Brandes' betweenness on the undirected, unweighted view, normalised like
/// `networkx.betweenness_centrality`: raw pair-dependency sums (both
/// directions) scaled by `1 / ((n-1)(n-2))`.
pub fn betweenness(graph: &BipartiteGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut cb = vec![0.0_f64; n];
    if n <= 2 {
        return cb;
    }
    let adj = adjacency(graph);

    for s in 0..n {
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adj[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
    cb.iter_mut().for_each(|c| *c *= scale);
    cb
}

/// Eigenvector centrality by power iteration on `A + I` of the undirected
/// view (the networkx scheme), L2-normalised.
pub fn eigenvector(graph: &BipartiteGraph) -> Result<Vec<f64>> {
    power_iteration(graph, EIGENVECTOR_MAX_ITER)
}

fn power_iteration(graph: &BipartiteGraph, max_iter: usize) -> Result<Vec<f64>> {
    let n = graph.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }
    let adj = adjacency(graph);
    let mut x = vec![1.0 / n as f64; n];

    for _ in 0..max_iter {
        let last = x.clone();
        for (v, neighbours) in adj.iter().enumerate() {
            for &w in neighbours {
                x[w] += last[v];
            }
        }
        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        x.iter_mut().for_each(|v| *v /= norm);

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * EIGENVECTOR_TOL {
            return Ok(x);
        }
    }
    Err(NetError::Convergence {
        iterations: max_iter,
    })
}

/// Connected components of the undirected view.
///
/// Ids are assigned 0.. in node order, so the component holding the first
/// miRNA (by id) is always 0.
pub fn components(graph: &BipartiteGraph) -> (Vec<usize>, usize) {
    let n = graph.node_count();
    let mut uf = UnionFind::<usize>::new(n);
    for edge in graph.inner().raw_edges() {
        uf.union(edge.source().index(), edge.target().index());
    }

    let mut ids: HashMap<usize, usize> = HashMap::new();
    let labels = (0..n)
        .map(|i| {
            let next = ids.len();
            *ids.entry(uf.find(i)).or_insert(next)
        })
        .collect();
    (labels, ids.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Interaction;
    use crate::network::build;

    fn graph(pairs: &[(&str, &str)]) -> BipartiteGraph {
        let edges: Vec<Interaction> = pairs
            .iter()
            .map(|(s, t)| Interaction {
                source: s.to_string(),
                target: t.to_string(),
                score: 1.0,
                tool_count: 1,
            })
            .collect();
        build(&edges).unwrap()
    }

    fn by_id<'a>(m: &'a NetworkMetrics, id: &str) -> &'a NodeMetrics {
        m.nodes.iter().find(|n| n.id == id).unwrap()
    }

    #[test]
    fn single_edge_graph() {
        let m = compute(&graph(&[("miR-21", "GENE1")]), &MetricsOptions::default()).unwrap();
        assert_eq!(m.summary.node_count, 2);
        assert_eq!(m.summary.edge_count, 1);
        assert_eq!(m.summary.density, 1.0);
        assert_eq!(m.summary.component_count, 1);
        for node in &m.nodes {
            assert_eq!(node.degree, 1);
            assert_eq!(node.degree_centrality, 1.0);
            assert_eq!(node.centrality, 0.0);
        }
    }

    #[test]
    fn empty_graph_reports_fallbacks() {
        let m = compute(&BipartiteGraph::new(), &MetricsOptions::default()).unwrap();
        assert!(m.nodes.is_empty());
        assert_eq!(m.summary.node_count, 0);
        assert_eq!(m.summary.component_count, 0);
        assert!(m.summary.density.is_nan());

        let eig = MetricsOptions {
            centrality: CentralityMeasure::Eigenvector,
        };
        assert!(compute(&BipartiteGraph::new(), &eig).unwrap().nodes.is_empty());
    }

    #[test]
    fn star_center_has_full_betweenness() {
        let m = compute(
            &graph(&[("miR-1", "A"), ("miR-1", "B"), ("miR-1", "C")]),
            &MetricsOptions::default(),
        )
        .unwrap();
        assert!((by_id(&m, "miR-1").centrality - 1.0).abs() < 1e-12);
        assert_eq!(by_id(&m, "A").centrality, 0.0);
        assert_eq!(by_id(&m, "miR-1").degree, 3);
        assert_eq!(by_id(&m, "A").category, "1");
    }

    #[test]
    fn path_betweenness_matches_networkx() {
        // miR-1 - A - miR-2 - B : path of 4 nodes, inner nodes score 2/3.
        let m = compute(
            &graph(&[("miR-1", "A"), ("miR-2", "A"), ("miR-2", "B")]),
            &MetricsOptions::default(),
        )
        .unwrap();
        assert!((by_id(&m, "A").centrality - 2.0 / 3.0).abs() < 1e-12);
        assert!((by_id(&m, "miR-2").centrality - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(by_id(&m, "miR-1").centrality, 0.0);
        assert_eq!(by_id(&m, "A").shared_by, 2);
        assert_eq!(by_id(&m, "A").category, "2");
        assert_eq!(by_id(&m, "miR-2").shared_by, 0);
        assert_eq!(by_id(&m, "miR-2").category, "");
    }

    #[test]
    fn components_and_density() {
        let m = compute(
            &graph(&[("miR-1", "A"), ("miR-2", "B"), ("miR-2", "C")]),
            &MetricsOptions::default(),
        )
        .unwrap();
        assert_eq!(m.summary.component_count, 2);
        assert_eq!(by_id(&m, "miR-1").component, 0);
        assert_eq!(by_id(&m, "A").component, 0);
        assert_eq!(by_id(&m, "miR-2").component, 1);
        assert_eq!(by_id(&m, "C").component, 1);
        // 3 edges out of 2 * 3 possible.
        assert!((m.summary.density - 0.5).abs() < 1e-12);
    }

    #[test]
    fn eigenvector_star_is_normalised_and_center_dominates() {
        let opts = MetricsOptions {
            centrality: CentralityMeasure::Eigenvector,
        };
        let m = compute(&graph(&[("miR-1", "A"), ("miR-1", "B"), ("miR-1", "C")]), &opts).unwrap();
        let norm: f64 = m.nodes.iter().map(|n| n.centrality * n.centrality).sum();
        assert!((norm - 1.0).abs() < 1e-9);
        // Star K(1,3): centre / leaf ratio is sqrt(3).
        let ratio = by_id(&m, "miR-1").centrality / by_id(&m, "A").centrality;
        assert!((ratio - 3.0_f64.sqrt()).abs() < 1e-3);
        assert_eq!(m.summary.centrality_measure, CentralityMeasure::Eigenvector);
    }

    #[test]
    fn eigenvector_reports_non_convergence() {
        let g = graph(&[("miR-1", "A"), ("miR-1", "B"), ("miR-1", "C")]);
        let err = power_iteration(&g, 1).unwrap_err();
        assert!(matches!(err, NetError::Convergence { iterations: 1 }));
        assert!(power_iteration(&g, EIGENVECTOR_MAX_ITER).is_ok());
    }

    #[test]
    fn eigenvector_on_disconnected_graph_favours_the_larger_component() {
        let opts = MetricsOptions {
            centrality: CentralityMeasure::Eigenvector,
        };
        let m = compute(
            &graph(&[("miR-1", "A"), ("miR-2", "B"), ("miR-2", "C")]),
            &opts,
        )
        .unwrap();
        assert!(m.nodes.iter().all(|n| n.centrality.is_finite() && n.centrality >= 0.0));
        let norm: f64 = m.nodes.iter().map(|n| n.centrality * n.centrality).sum();
        assert!((norm - 1.0).abs() < 1e-9);
        // The star K(1,2) dominates: (sqrt 2, 1, 1) / 2. The lone pair decays.
        assert!((by_id(&m, "miR-2").centrality - 0.5_f64.sqrt()).abs() < 1e-3);
        assert!((by_id(&m, "B").centrality - 0.5).abs() < 1e-3);
        assert!(by_id(&m, "miR-1").centrality < 1e-3);
        assert!(by_id(&m, "A").centrality < 1e-3);
    }

    #[test]
    fn degree_matches_edge_count_per_node() {
        let pairs = [("miR-1", "A"), ("miR-1", "B"), ("miR-2", "A"), ("miR-3", "A")];
        let m = compute(&graph(&pairs), &MetricsOptions::default()).unwrap();
        for node in &m.nodes {
            let direct = pairs
                .iter()
                .filter(|(s, t)| match node.side {
                    Side::Entity => *s == node.id,
                    Side::Target => *t == node.id,
                })
                .count();
            assert_eq!(node.degree, direct, "{}", node.id);
        }
    }
}
