//! miRNA → target regulatory network construction.
//!
//! Loads a differentially-expressed miRNA list and a target-prediction
//! table, keeps the interactions of DE miRNAs, builds a directed bipartite
//! graph and exports the edge list, per-node metrics and a graph summary.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod network;
pub mod pipeline;

pub use config::Config;
pub use error::{NetError, Result};
pub use pipeline::{run, RunReport};
