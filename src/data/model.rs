use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell – a single value read from a tabular input
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
///
/// Every input format (CSV/TSV, JSON records, Parquet) is first read into a
/// [`RawTable`] of cells; typed records are extracted from that afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => Ok(()),
        }
    }
}

impl Cell {
    /// Interpret the cell as a number. Strings are parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text form with surrounding whitespace removed; `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        let text = self.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::String(s) => s.trim().is_empty(),
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – header + rows, before typing
// ---------------------------------------------------------------------------

/// A loaded table: ordered column names and rows of cells.
///
/// Fully empty rows are dropped at load time, so `rows[i]` is data row
/// `row_numbers[i]` (1-based, header excluded) in the source file.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub row_numbers: Vec<usize>,
}

impl RawTable {
    pub fn new(path: PathBuf, columns: Vec<String>) -> Self {
        RawTable {
            path,
            columns,
            rows: Vec::new(),
            row_numbers: Vec::new(),
        }
    }

    /// Append a row unless every cell in it is empty.
    pub fn push_row(&mut self, row_number: usize, cells: Vec<Cell>) {
        if cells.iter().all(Cell::is_empty) {
            return;
        }
        self.rows.push(cells);
        self.row_numbers.push(row_number);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// Which side of the bipartite network a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "miRNA")]
    Entity,
    #[serde(rename = "gene")]
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Entity => write!(f, "miRNA"),
            Side::Target => write!(f, "gene"),
        }
    }
}

/// Direction of differential expression between the two cohort groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regulation {
    Up,
    Down,
    Unknown,
}

impl Regulation {
    /// Parse an explicit label ("up", "Down", "UP-regulated", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim().to_ascii_lowercase();
        if l.starts_with("up") {
            Some(Regulation::Up)
        } else if l.starts_with("down") {
            Some(Regulation::Down)
        } else {
            None
        }
    }

    /// Derive from the sign of a fold-change.
    pub fn from_fold_change(lfc: Option<f64>) -> Self {
        match lfc {
            Some(v) if v > 0.0 => Regulation::Up,
            Some(v) if v < 0.0 => Regulation::Down,
            _ => Regulation::Unknown,
        }
    }

    /// File-name prefix for per-regulation networks.
    pub fn prefix(&self) -> &'static str {
        match self {
            Regulation::Up => "up_",
            Regulation::Down => "down_",
            Regulation::Unknown => "",
        }
    }
}

impl fmt::Display for Regulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regulation::Up => write!(f, "up"),
            Regulation::Down => write!(f, "down"),
            Regulation::Unknown => write!(f, "unknown"),
        }
    }
}

/// A differentially expressed miRNA as reported by the upstream analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DeEntity {
    pub id: String,
    pub log2_fold_change: Option<f64>,
    pub p_value: Option<f64>,
    pub regulation: Regulation,
}

impl DeEntity {
    /// Entity with no statistics attached.
    pub fn bare(id: &str) -> Self {
        DeEntity {
            id: id.to_string(),
            log2_fold_change: None,
            p_value: None,
            regulation: Regulation::Unknown,
        }
    }
}

/// One raw row of the target-prediction table.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// 1-based data row in the source file.
    pub row: usize,
    pub source: String,
    pub target: String,
    pub score: f64,
    pub tool: Option<String>,
}

/// A deduplicated miRNA → target edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub source: String,
    pub target: String,
    pub score: f64,
    pub tool_count: usize,
}

/// Normalised identifier used for set membership.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}
