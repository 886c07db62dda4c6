//! Command-line arguments for the network builder.
//!
//! Every flag overrides the matching key of an optional JSON config file;
//! anything left unset falls back to the file, then to the built-in default.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mirna_net::config::{CentralityMeasure, Config, MergePolicy, PredictionLayout};

#[derive(Debug, Parser)]
#[command(version, about = "Build a miRNA-target regulatory network and its graph metrics")]
pub struct Args {
    #[arg(
        short = 'd',
        long = "de",
        value_name = "PATH",
        help = "Differentially expressed miRNA table (.csv/.tsv/.parquet/.json)"
    )]
    pub de: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "predictions",
        value_name = "PATH",
        help = "miRNA-target prediction table (.csv/.tsv/.parquet/.json)"
    )]
    pub predictions: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "outdir",
        value_name = "PATH",
        help = "Output directory path [default: network]"
    )]
    pub outdir: Option<PathBuf>,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "JSON configuration file"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "min-score",
        value_name = "SCORE",
        help = "Keep predictions with score >= SCORE [default: no threshold]"
    )]
    pub min_score: Option<f64>,

    #[arg(
        short = 'm',
        long = "merge",
        value_enum,
        value_name = "POLICY",
        help = "How duplicate miRNA-target rows are merged [default: sum]"
    )]
    pub merge: Option<MergePolicy>,

    #[arg(
        long = "centrality",
        value_enum,
        value_name = "MEASURE",
        help = "Global centrality measure [default: betweenness]"
    )]
    pub centrality: Option<CentralityMeasure>,

    #[arg(
        long = "min-shared",
        value_name = "N",
        help = "Keep only targets shared by at least N miRNAs [default: 1]"
    )]
    pub min_shared: Option<usize>,

    #[arg(
        long = "wide",
        help = "Prediction table lists targets under one column per miRNA"
    )]
    pub wide: bool,

    #[arg(
        long = "split-regulation",
        help = "Build separate up- and down-regulated networks"
    )]
    pub split_regulation: bool,

    #[arg(long = "tsv", help = "Write tab-separated output")]
    pub tsv: bool,
}

impl Args {
    pub fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(p) = self.de {
            config.de_path = p;
        }
        if let Some(p) = self.predictions {
            config.predictions_path = p;
        }
        if let Some(p) = self.outdir {
            config.output_dir = p;
        }
        if self.min_score.is_some() {
            config.filter.min_score = self.min_score;
        }
        if let Some(m) = self.merge {
            config.filter.merge_policy = m;
        }
        if let Some(c) = self.centrality {
            config.metrics.centrality = c;
        }
        if let Some(n) = self.min_shared {
            config.filter.min_shared = n;
        }
        if self.wide {
            config.prediction_schema.layout = PredictionLayout::Wide;
        }
        if self.split_regulation {
            config.split_regulation = true;
        }
        if self.tsv {
            config.output_delimiter = '\t';
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "mirna-net",
            "--de",
            "de.csv",
            "--predictions",
            "t.parquet",
            "--min-score",
            "0.5",
            "--merge",
            "max",
            "--centrality",
            "eigenvector",
            "--min-shared",
            "2",
            "--wide",
            "--tsv",
        ]);
        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.de_path, PathBuf::from("de.csv"));
        assert_eq!(cfg.predictions_path, PathBuf::from("t.parquet"));
        assert_eq!(cfg.filter.min_score, Some(0.5));
        assert_eq!(cfg.filter.merge_policy, MergePolicy::Max);
        assert_eq!(cfg.metrics.centrality, CentralityMeasure::Eigenvector);
        assert_eq!(cfg.filter.min_shared, 2);
        assert_eq!(cfg.prediction_schema.layout, PredictionLayout::Wide);
        assert_eq!(cfg.output_delimiter, '\t');
        assert!(!cfg.split_regulation);
    }

    #[test]
    fn zero_min_shared_is_rejected() {
        let args = Args::parse_from(["mirna-net", "--min-shared", "0"]);
        assert!(args.into_config().is_err());
    }
}
