//! Tabular output. Column order and header names are fixed by the row
//! structs below; nothing here computes.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::color::ColorMap;
use crate::data::model::{Interaction, Regulation, Side};
use crate::error::Result;
use crate::network::{GraphSummary, NodeMetrics};

/// `source,target,score,tool_count`
#[derive(Debug, Serialize)]
pub struct EdgeRow<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub score: f64,
    pub tool_count: usize,
}

/// `node,side,regulation,degree,degree_centrality,centrality,component,shared_by,category,color`
#[derive(Debug, Serialize)]
pub struct NodeRow<'a> {
    pub node: &'a str,
    pub side: Side,
    /// Empty for targets.
    pub regulation: Option<Regulation>,
    pub degree: usize,
    pub degree_centrality: f64,
    pub centrality: f64,
    pub component: usize,
    pub shared_by: usize,
    pub category: &'a str,
    pub color: &'a str,
}

/// `network,node_count,entity_count,target_count,edge_count,density,component_count,centrality_measure`
#[derive(Debug, Serialize)]
pub struct SummaryRow<'a> {
    pub network: &'a str,
    pub node_count: usize,
    pub entity_count: usize,
    pub target_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub component_count: usize,
    pub centrality_measure: &'static str,
}

impl<'a> SummaryRow<'a> {
    pub fn new(network: &'a str, s: &GraphSummary) -> Self {
        SummaryRow {
            network,
            node_count: s.node_count,
            entity_count: s.entity_count,
            target_count: s.target_count,
            edge_count: s.edge_count,
            density: s.density,
            component_count: s.component_count,
            centrality_measure: s.centrality_measure.name(),
        }
    }
}

fn writer<W: Write>(out: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_writer(out)
}

/// Serialise rows with a header line even when `rows` is empty.
pub fn write_rows<W, T>(out: W, delimiter: u8, headers: &[&str], rows: &[T]) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut wtr = writer(out, delimiter);
    if rows.is_empty() {
        wtr.write_record(headers)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub const EDGE_HEADERS: [&str; 4] = ["source", "target", "score", "tool_count"];
pub const NODE_HEADERS: [&str; 10] = [
    "node",
    "side",
    "regulation",
    "degree",
    "degree_centrality",
    "centrality",
    "component",
    "shared_by",
    "category",
    "color",
];
pub const SUMMARY_HEADERS: [&str; 8] = [
    "network",
    "node_count",
    "entity_count",
    "target_count",
    "edge_count",
    "density",
    "component_count",
    "centrality_measure",
];

pub fn edge_rows(edges: &[Interaction]) -> Vec<EdgeRow<'_>> {
    edges
        .iter()
        .map(|e| EdgeRow {
            source: &e.source,
            target: &e.target,
            score: e.score,
            tool_count: e.tool_count,
        })
        .collect()
}

/// Join node metrics with regulation and colour annotations.
pub fn node_rows<'a, F>(
    nodes: &'a [NodeMetrics],
    colors: &'a ColorMap,
    regulation_of: F,
) -> Vec<NodeRow<'a>>
where
    F: Fn(&str) -> Regulation,
{
    nodes
        .iter()
        .map(|n| {
            let (regulation, color) = match n.side {
                Side::Entity => (Some(regulation_of(&n.id)), colors.color_for(&n.id)),
                Side::Target => (None, ColorMap::category_color(n.category)),
            };
            NodeRow {
                node: &n.id,
                side: n.side,
                regulation,
                degree: n.degree,
                degree_centrality: n.degree_centrality,
                centrality: n.centrality,
                component: n.component,
                shared_by: n.shared_by,
                category: n.category,
                color,
            }
        })
        .collect()
}

pub fn write_edges(path: &Path, delimiter: u8, edges: &[Interaction]) -> Result<()> {
    write_rows(File::create(path)?, delimiter, &EDGE_HEADERS, &edge_rows(edges))
}

pub fn write_nodes(path: &Path, delimiter: u8, rows: &[NodeRow<'_>]) -> Result<()> {
    write_rows(File::create(path)?, delimiter, &NODE_HEADERS, rows)
}

pub fn write_summary(path: &Path, delimiter: u8, rows: &[SummaryRow<'_>]) -> Result<()> {
    write_rows(File::create(path)?, delimiter, &SUMMARY_HEADERS, rows)
}
