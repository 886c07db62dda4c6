use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};

// ---------------------------------------------------------------------------
// Input schemas
// ---------------------------------------------------------------------------

/// Column names of the differentially-expressed miRNA table.
///
/// Only `id` is required; the statistics columns are read when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeSchema {
    pub id: String,
    pub log2_fold_change: String,
    pub p_value: String,
    pub regulation: String,
}

impl Default for DeSchema {
    fn default() -> Self {
        DeSchema {
            id: "miRNA".to_string(),
            log2_fold_change: "log2FoldChange".to_string(),
            p_value: "padj".to_string(),
            regulation: "regulation".to_string(),
        }
    }
}

/// How the prediction table is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PredictionLayout {
    /// One row per (miRNA, target, score[, tool]).
    #[default]
    Long,
    /// One column per miRNA, target genes listed underneath.
    Wide,
}

/// Column names of the miRNA → target prediction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSchema {
    pub layout: PredictionLayout,
    pub source: String,
    pub target: String,
    pub score: String,
    /// Optional; when present duplicate pairs count distinct tools.
    pub tool: String,
}

impl Default for PredictionSchema {
    fn default() -> Self {
        PredictionSchema {
            layout: PredictionLayout::Long,
            source: "miRNA".to_string(),
            target: "target".to_string(),
            score: "score".to_string(),
            tool: "tool".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage options
// ---------------------------------------------------------------------------

/// How duplicate (miRNA, target) rows are combined into one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Sum of the supporting scores.
    #[default]
    Sum,
    /// Highest supporting score.
    Max,
    /// Arithmetic mean of the supporting scores.
    Mean,
    /// Number of supporting rows; input scores are ignored.
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Keep rows with `score >= min_score`. `None` keeps everything.
    pub min_score: Option<f64>,
    pub merge_policy: MergePolicy,
    /// Keep only targets shared by at least this many miRNAs (1 = off).
    pub min_shared: usize,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            min_score: None,
            merge_policy: MergePolicy::Sum,
            min_shared: 1,
        }
    }
}

/// Global centrality definition written to the `centrality` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CentralityMeasure {
    /// Brandes betweenness on the undirected, unweighted graph,
    /// normalised by 2 / ((n-1)(n-2)).
    #[default]
    Betweenness,
    /// Power iteration on A + I of the undirected graph, L2-normalised.
    Eigenvector,
}

impl CentralityMeasure {
    pub fn name(&self) -> &'static str {
        match self {
            CentralityMeasure::Betweenness => "betweenness",
            CentralityMeasure::Eigenvector => "eigenvector",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsOptions {
    pub centrality: CentralityMeasure,
}

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub de_path: PathBuf,
    pub predictions_path: PathBuf,
    pub output_dir: PathBuf,
    pub de_schema: DeSchema,
    pub prediction_schema: PredictionSchema,
    pub filter: FilterOptions,
    pub metrics: MetricsOptions,
    /// Build separate up- and down-regulated networks.
    pub split_regulation: bool,
    pub output_delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            de_path: PathBuf::from("de.csv"),
            predictions_path: PathBuf::from("targets.csv"),
            output_dir: PathBuf::from("network"),
            de_schema: DeSchema::default(),
            prediction_schema: PredictionSchema::default(),
            filter: FilterOptions::default(),
            metrics: MetricsOptions::default(),
            split_regulation: false,
            output_delimiter: ',',
        }
    }
}

impl Config {
    /// Read a JSON configuration file; absent keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NetError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filter.min_shared == 0 {
            return Err(NetError::Config("min_shared must be at least 1".into()));
        }
        if let Some(t) = self.filter.min_score {
            if !t.is_finite() {
                return Err(NetError::Config(format!("min_score must be finite, got {t}")));
            }
        }
        if !self.output_delimiter.is_ascii() {
            return Err(NetError::Config(format!(
                "output delimiter must be a single ASCII character, got '{}'",
                self.output_delimiter
            )));
        }
        if matches!(self.output_delimiter, '"' | '\n' | '\r') {
            return Err(NetError::Config(format!(
                "output delimiter {:?} clashes with csv quoting or line endings",
                self.output_delimiter
            )));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.output_delimiter as u8
    }

    /// File extension matching the output delimiter.
    pub fn output_extension(&self) -> &'static str {
        if self.output_delimiter == '\t' {
            "tsv"
        } else {
            "csv"
        }
    }
}
