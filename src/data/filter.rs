use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use super::model::{normalize_id, DeEntity, Interaction, Prediction, Regulation};
use crate::config::{FilterOptions, MergePolicy};
use crate::error::{NetError, Result};

// ---------------------------------------------------------------------------
// Filter outcome
// ---------------------------------------------------------------------------

/// Retained edges plus the bookkeeping counts logged by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Sorted by (source, target).
    pub edges: Vec<Interaction>,
    pub rows_read: usize,
    /// Rows whose source is a DE miRNA.
    pub rows_matched: usize,
    /// Matched rows dropped by the score threshold.
    pub rows_below_threshold: usize,
    /// Rows folded into an already-seen (source, target) pair.
    pub duplicates_merged: usize,
    /// Edges dropped because their target is shared by too few miRNAs.
    pub edges_unshared: usize,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Merge accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Support {
    scores: Vec<f64>,
    tools: BTreeSet<String>,
    rows: usize,
    rows_without_tool: usize,
}

impl Support {
    fn score(&self, policy: MergePolicy) -> f64 {
        match policy {
            MergePolicy::Sum => self.scores.iter().sum(),
            MergePolicy::Max => self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            MergePolicy::Mean => self.scores.iter().sum::<f64>() / self.scores.len() as f64,
            MergePolicy::Count => self.rows as f64,
        }
    }

    /// Distinct named tools, plus one for any supporting rows without a
    /// tool. With no named tool at all every row counts once.
    fn tool_count(&self) -> usize {
        if self.tools.is_empty() {
            self.rows
        } else {
            self.tools.len() + usize::from(self.rows_without_tool > 0)
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction filter
// ---------------------------------------------------------------------------

/// Restrict predictions to DE miRNAs, apply the score threshold and merge
/// duplicate pairs.
///
/// * Membership is case-insensitive on trimmed ids; retained edges carry the
///   DE list's spelling (first occurrence wins on duplicate DE ids).
/// * A row with a NaN score never passes a configured threshold.
/// * Scores of duplicate pairs are combined in input order.
/// * A retained row whose target is itself a DE miRNA breaks the bipartite
///   split and is reported as [`NetError::InvariantViolation`].
pub fn filter(
    predictions: &[Prediction],
    de_entities: &[DeEntity],
    options: &FilterOptions,
) -> Result<FilterOutcome> {
    let mut canonical: HashMap<String, &str> = HashMap::with_capacity(de_entities.len());
    for e in de_entities {
        canonical.entry(normalize_id(&e.id)).or_insert(e.id.as_str());
    }

    let mut outcome = FilterOutcome {
        rows_read: predictions.len(),
        ..FilterOutcome::default()
    };
    let mut merged: BTreeMap<(String, String), Support> = BTreeMap::new();

    for p in predictions {
        let Some(&source) = canonical.get(&normalize_id(&p.source)) else {
            continue;
        };
        outcome.rows_matched += 1;

        if let Some(min) = options.min_score {
            if p.score.is_nan() || p.score < min {
                outcome.rows_below_threshold += 1;
                continue;
            }
        }

        if canonical.contains_key(&normalize_id(&p.target)) {
            return Err(NetError::InvariantViolation {
                row: p.row,
                source_id: p.source.clone(),
                target: p.target.clone(),
            });
        }

        let support = merged
            .entry((source.to_string(), p.target.clone()))
            .or_default();
        if support.rows > 0 {
            outcome.duplicates_merged += 1;
            debug!("merging duplicate {} -> {} (row {})", source, p.target, p.row);
        }
        support.rows += 1;
        support.scores.push(p.score);
        match &p.tool {
            Some(tool) => {
                support.tools.insert(tool.clone());
            }
            None => support.rows_without_tool += 1,
        }
    }

    let edges: Vec<Interaction> = merged
        .into_iter()
        .map(|((source, target), support)| Interaction {
            score: support.score(options.merge_policy),
            tool_count: support.tool_count(),
            source,
            target,
        })
        .collect();

    let before = edges.len();
    outcome.edges = retain_shared(edges, options.min_shared);
    outcome.edges_unshared = before - outcome.edges.len();
    Ok(outcome)
}

/// Keep edges whose target is regulated by at least `min_shared` distinct
/// miRNAs. Order is preserved.
pub fn retain_shared(edges: Vec<Interaction>, min_shared: usize) -> Vec<Interaction> {
    if min_shared <= 1 {
        return edges;
    }
    let shared = sharing_counts(&edges);
    edges
        .into_iter()
        .filter(|e| shared.get(e.target.as_str()).copied().unwrap_or(0) >= min_shared)
        .collect()
}

/// Number of distinct miRNAs targeting each gene. Edges are already unique
/// per pair, so this is a plain count per target.
pub fn sharing_counts(edges: &[Interaction]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for e in edges {
        *counts.entry(e.target.clone()).or_default() += 1;
    }
    counts
}

/// Sharing category as drawn in the ring layout: "1", "2", "3" or "4+".
pub fn sharing_category(shared_by: usize) -> &'static str {
    match shared_by {
        0 => "",
        1 => "1",
        2 => "2",
        3 => "3",
        _ => "4+",
    }
}

// ---------------------------------------------------------------------------
// Regulation split
// ---------------------------------------------------------------------------

/// Edges partitioned by the regulation of their source miRNA.
#[derive(Debug, Clone, Default)]
pub struct RegulationSplit {
    pub up: Vec<Interaction>,
    pub down: Vec<Interaction>,
    /// Edges whose source has no known direction; kept in neither network.
    pub unknown: usize,
}

/// Partition edges into up- and down-regulated networks.
///
/// Edges from miRNAs with unknown direction go to neither and are counted in
/// [`RegulationSplit::unknown`]. Sharing is counted within each network, so
/// `min_shared` is applied per subset.
pub fn split_by_regulation(
    edges: &[Interaction],
    de_entities: &[DeEntity],
    min_shared: usize,
) -> RegulationSplit {
    let mut direction: HashMap<String, Regulation> = HashMap::with_capacity(de_entities.len());
    for e in de_entities {
        direction.entry(normalize_id(&e.id)).or_insert(e.regulation);
    }

    let mut split = RegulationSplit::default();
    for e in edges {
        match direction.get(&normalize_id(&e.source)) {
            Some(Regulation::Up) => split.up.push(e.clone()),
            Some(Regulation::Down) => split.down.push(e.clone()),
            _ => split.unknown += 1,
        }
    }
    split.up = retain_shared(split.up, min_shared);
    split.down = retain_shared(split.down, min_shared);
    split
}
