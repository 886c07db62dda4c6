//! Writes a small deterministic cohort for end-to-end runs:
//! `sample_de.csv`, `sample_predictions.parquet` and `sample_predictions.csv`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

const MIRNAS: [(&str, f64); 8] = [
    ("hsa-miR-21-5p", 1.8),
    ("hsa-miR-155-5p", 1.2),
    ("hsa-miR-122-5p", 2.4),
    ("hsa-miR-34a-5p", 0.9),
    ("hsa-miR-33a-5p", -1.1),
    ("hsa-miR-126-3p", -1.6),
    ("hsa-miR-375-3p", -0.8),
    ("hsa-miR-223-3p", -2.1),
];

/// Predicted but not differentially expressed; filtered out downstream.
const BACKGROUND: [&str; 3] = ["hsa-let-7a-5p", "hsa-miR-16-5p", "hsa-miR-92a-3p"];

const GENES: [&str; 24] = [
    "PTEN", "PDCD4", "SMAD7", "SOCS1", "INPP5D", "ABCA1", "CPT1A", "SIRT1", "IRS1", "IRS2",
    "INSR", "FOXO1", "PPARGC1A", "SLC2A4", "AKT2", "PIK3R1", "TLR4", "STAT3", "IGF1R", "VEGFA",
    "SPRED1", "PIK3R2", "MTPN", "NLRP3",
];

const TOOLS: [&str; 3] = ["TargetScan", "miRDB", "miRTarBase"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // DE list
    let mut de = csv::Writer::from_path("sample_de.csv").context("creating sample_de.csv")?;
    de.write_record(["miRNA", "log2FoldChange", "padj"])?;
    for (i, (id, lfc)) in MIRNAS.iter().enumerate() {
        let padj = 1e-4 * (i + 1) as f64;
        de.write_record([id.to_string(), lfc.to_string(), padj.to_string()])?;
    }
    de.flush()?;

    // Predictions: each miRNA hits a handful of genes, some through several tools.
    let mut sources = Vec::new();
    let mut targets = Vec::new();
    let mut scores = Vec::new();
    let mut tools = Vec::new();

    let all: Vec<&str> = MIRNAS.iter().map(|(id, _)| *id).chain(BACKGROUND).collect();
    for mirna in all {
        let n_targets = 3 + rng.below(5);
        for _ in 0..n_targets {
            let gene = GENES[rng.below(GENES.len())];
            let n_tools = 1 + rng.below(TOOLS.len());
            for tool in TOOLS.iter().take(n_tools) {
                sources.push(mirna.to_string());
                targets.push(gene.to_string());
                scores.push((rng.next_f64() * 1000.0).round() / 1000.0);
                tools.push(tool.to_string());
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("miRNA", DataType::Utf8, false),
        Field::new("target", DataType::Utf8, false),
        Field::new("score", DataType::Float64, false),
        Field::new("tool", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(sources.clone())),
            Arc::new(StringArray::from(targets.clone())),
            Arc::new(Float64Array::from(scores.clone())),
            Arc::new(StringArray::from(tools.clone())),
        ],
    )
    .context("building record batch")?;

    let output_path = "sample_predictions.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch)?;
    writer.close()?;

    let mut pred = csv::Writer::from_path("sample_predictions.csv")
        .context("creating sample_predictions.csv")?;
    pred.write_record(["miRNA", "target", "score", "tool"])?;
    for i in 0..sources.len() {
        pred.write_record([
            sources[i].as_str(),
            targets[i].as_str(),
            &scores[i].to_string(),
            tools[i].as_str(),
        ])?;
    }
    pred.flush()?;

    println!(
        "Wrote {} DE miRNAs and {} prediction rows to sample_de.csv, {output_path}, sample_predictions.csv",
        MIRNAS.len(),
        sources.len()
    );
    Ok(())
}
