use std::path::PathBuf;

use thiserror::Error;

/// Every failure the network pipeline can surface.
///
/// Variants carry the file, row and column needed to diagnose a bad input
/// without re-running. An empty filter result is *not* an error; it is
/// logged as a warning and the pipeline emits empty-but-valid tables.
#[derive(Debug, Error)]
pub enum NetError {
    /// Required input file absent.
    #[error("missing input file: {}", path.display())]
    MissingInput { path: PathBuf },

    /// Required column absent from an input table.
    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A cell that could not be interpreted. `row` is the 1-based data row.
    #[error("{}: row {row}, column '{column}': invalid value '{value}'", path.display())]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{}: unsupported file extension '.{ext}'", path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },

    /// An edge would connect two nodes on the same side of the bipartite graph.
    #[error("bipartite invariant violated at row {row}: '{source_id}' -> '{target}'")]
    InvariantViolation {
        row: usize,
        source_id: String,
        target: String,
    },

    #[error("eigenvector centrality did not converge within {iterations} iterations")]
    Convergence { iterations: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, NetError>;
