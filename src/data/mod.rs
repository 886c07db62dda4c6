/// Data layer: input records, loading, and interaction filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable → DeEntity / Prediction
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  DE membership, threshold, merge → sorted Interactions
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
