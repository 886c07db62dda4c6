use std::path::Path;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, DeEntity, Prediction, RawTable, Regulation};
use crate::config::{DeSchema, PredictionLayout, PredictionSchema};
use crate::error::{NetError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the differentially-expressed miRNA list.
pub fn load_de_entities(path: &Path, schema: &DeSchema) -> Result<Vec<DeEntity>> {
    let table = read_table(path)?;
    let entities = de_from_table(&table, schema)?;
    info!("Loaded {} DE miRNAs from {}", entities.len(), path.display());
    Ok(entities)
}

/// Load the miRNA → target prediction table in the configured layout.
pub fn load_predictions(path: &Path, schema: &PredictionSchema) -> Result<Vec<Prediction>> {
    let table = read_table(path)?;
    let predictions = match schema.layout {
        PredictionLayout::Long => predictions_from_table(&table, schema)?,
        PredictionLayout::Wide => target_lists_from_table(&table),
    };
    info!(
        "Loaded {} prediction rows from {}",
        predictions.len(),
        path.display()
    );
    Ok(predictions)
}

/// Load a wide target-list export: one column per miRNA, genes underneath.
pub fn load_target_lists(path: &Path) -> Result<Vec<Prediction>> {
    let table = read_table(path)?;
    Ok(target_lists_from_table(&table))
}

/// Read any supported file into a [`RawTable`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`              – comma delimited, header row
/// * `.tsv` / `.txt`     – tab delimited, header row
/// * `.parquet` / `.pq`  – flat columns of strings / numbers / bools
/// * `.json`             – `[{ "miRNA": "...", "target": "...", ... }, ...]`
pub fn read_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(NetError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_delimited(path, b',')?,
        "tsv" | "txt" => read_delimited(path, b'\t')?,
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        other => {
            return Err(NetError::UnsupportedFormat {
                path: path.to_path_buf(),
                ext: other.to_string(),
            })
        }
    };
    debug!(
        "{}: {} columns, {} non-empty rows",
        path.display(),
        table.columns.len(),
        table.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Typed extraction
// ---------------------------------------------------------------------------

fn require_column(table: &RawTable, column: &str) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| NetError::MissingColumn {
            path: table.path.clone(),
            column: column.to_string(),
        })
}

/// Identifier cell; empty identifiers are rejected rather than skipped.
fn required_text(table: &RawTable, i: usize, col: usize) -> Result<String> {
    table.rows[i]
        .get(col)
        .and_then(Cell::as_text)
        .ok_or_else(|| NetError::InvalidValue {
            path: table.path.clone(),
            row: table.row_numbers[i],
            column: table.columns[col].clone(),
            value: String::new(),
        })
}

fn is_missing_marker(s: &str) -> bool {
    matches!(s, "NA" | "N/A" | "NaN" | "nan" | "null" | "-")
}

/// Optional numeric cell. Empty and R-style `NA` cells are `None`; anything
/// else that is not a number is an error.
fn optional_number(table: &RawTable, i: usize, col: Option<usize>) -> Result<Option<f64>> {
    let Some(col) = col else {
        return Ok(None);
    };
    let cell = match table.rows[i].get(col) {
        Some(c) => c,
        None => return Ok(None),
    };
    let Some(text) = cell.as_text() else {
        return Ok(None);
    };
    if is_missing_marker(&text) {
        return Ok(None);
    }
    cell.as_f64()
        .map(Some)
        .ok_or_else(|| NetError::InvalidValue {
            path: table.path.clone(),
            row: table.row_numbers[i],
            column: table.columns[col].clone(),
            value: text,
        })
}

/// Explicit regulation label. Empty and `NA`-style cells are `None` so the
/// fold-change sign decides; any other label must read as up or down.
fn regulation_label(table: &RawTable, i: usize, col: Option<usize>) -> Result<Option<Regulation>> {
    let Some(col) = col else {
        return Ok(None);
    };
    let Some(text) = table.rows[i].get(col).and_then(Cell::as_text) else {
        return Ok(None);
    };
    if is_missing_marker(&text) {
        return Ok(None);
    }
    Regulation::from_label(&text)
        .map(Some)
        .ok_or_else(|| NetError::InvalidValue {
            path: table.path.clone(),
            row: table.row_numbers[i],
            column: table.columns[col].clone(),
            value: text,
        })
}

pub fn de_from_table(table: &RawTable, schema: &DeSchema) -> Result<Vec<DeEntity>> {
    let id_idx = require_column(table, &schema.id)?;
    let lfc_idx = table.column_index(&schema.log2_fold_change);
    let p_idx = table.column_index(&schema.p_value);
    let reg_idx = table.column_index(&schema.regulation);

    let mut entities = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let id = required_text(table, i, id_idx)?;
        let log2_fold_change = optional_number(table, i, lfc_idx)?;
        let p_value = optional_number(table, i, p_idx)?;

        let regulation = match regulation_label(table, i, reg_idx)? {
            Some(labelled) => labelled,
            None => Regulation::from_fold_change(log2_fold_change),
        };

        entities.push(DeEntity {
            id,
            log2_fold_change,
            p_value,
            regulation,
        });
    }
    Ok(entities)
}

pub fn predictions_from_table(table: &RawTable, schema: &PredictionSchema) -> Result<Vec<Prediction>> {
    let src_idx = require_column(table, &schema.source)?;
    let tgt_idx = require_column(table, &schema.target)?;
    let score_idx = require_column(table, &schema.score)?;
    let tool_idx = table.column_index(&schema.tool);

    let mut predictions = Vec::with_capacity(table.len());
    for i in 0..table.len() {
        let row = table.row_numbers[i];
        let source = required_text(table, i, src_idx)?;
        let target = required_text(table, i, tgt_idx)?;

        let score_cell = table.rows[i].get(score_idx).cloned().unwrap_or(Cell::Null);
        let score = score_cell
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| NetError::InvalidValue {
                path: table.path.clone(),
                row,
                column: schema.score.clone(),
                value: score_cell.to_string(),
            })?;

        let tool = tool_idx
            .and_then(|c| table.rows[i].get(c))
            .and_then(Cell::as_text);

        predictions.push(Prediction {
            row,
            source,
            target,
            score,
            tool,
        });
    }
    Ok(predictions)
}

/// Wide layout: the header names the miRNAs, each non-empty cell is a target.
/// Every listed pair gets score 1.0 and tool `"list"`.
pub fn target_lists_from_table(table: &RawTable) -> Vec<Prediction> {
    let mut predictions = Vec::new();
    for (col, mirna) in table.columns.iter().enumerate() {
        let mirna = mirna.trim();
        if mirna.is_empty() {
            continue;
        }
        for (i, cells) in table.rows.iter().enumerate() {
            if let Some(gene) = cells.get(col).and_then(Cell::as_text) {
                predictions.push(Prediction {
                    row: table.row_numbers[i],
                    source: mirna.to_string(),
                    target: gene,
                    score: 1.0,
                    tool: Some("list".to_string()),
                });
            }
        }
    }
    predictions
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Header row with column names; every field is kept as text and typed later.
fn read_delimited(path: &Path, delimiter: u8) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = RawTable::new(path.to_path_buf(), headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells = (0..table.columns.len())
            .map(|c| match record.get(c) {
                Some(v) if !v.is_empty() => Cell::String(v.to_string()),
                _ => Cell::Null,
            })
            .collect();
        table.push_row(row_no + 1, cells);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "miRNA": "hsa-miR-21-5p", "target": "PTEN", "score": 0.93 },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| NetError::InvalidValue {
        path: path.to_path_buf(),
        row: 0,
        column: String::new(),
        value: "expected top-level JSON array".to_string(),
    })?;

    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut table = RawTable::new(path.to_path_buf(), columns);
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| NetError::InvalidValue {
            path: path.to_path_buf(),
            row: i + 1,
            column: String::new(),
            value: rec.to_string(),
        })?;
        let cells = table
            .columns
            .iter()
            .map(|c| obj.get(c).map(json_to_cell).unwrap_or(Cell::Null))
            .collect();
        table.push_row(i + 1, cells);
    }
    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table, as written by `df.to_parquet()` (Pandas) or
/// `df.write_parquet()` (Polars).
///
/// Dictionary-encoded columns (pandas `category`) and narrow integer/float
/// types are cast to Utf8 / Int64 / Float64 first. Columns of any other type
/// (dates, nested data) load as empty cells; they only fail later if a
/// schema column actually reads them.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    for field in builder.schema().fields() {
        if cell_type(field.data_type()).is_none() {
            warn!(
                "{}: column '{}' has unsupported type {:?}; its cells load as empty",
                path.display(),
                field.name(),
                field.data_type()
            );
        }
    }
    let reader = builder.build()?;

    let mut table = RawTable::new(path.to_path_buf(), columns);
    let mut row_number = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let arrays = batch
            .columns()
            .iter()
            .map(normalise_column)
            .collect::<Result<Vec<Option<ArrayRef>>>>()?;
        for row in 0..batch.num_rows() {
            row_number += 1;
            let cells = arrays
                .iter()
                .map(|col| col.as_ref().map_or(Cell::Null, |c| extract_cell(c, row)))
                .collect();
            table.push_row(row_number, cells);
        }
    }
    Ok(table)
}

/// Type a column is read as, or `None` when it is not read at all.
fn cell_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int64
        | DataType::Float64
        | DataType::Boolean => Some(data_type.clone()),
        DataType::Utf8View => Some(DataType::Utf8),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => Some(DataType::Int64),
        DataType::Float16 | DataType::Float32 => Some(DataType::Float64),
        DataType::Dictionary(_, values) => cell_type(values),
        _ => None,
    }
}

fn normalise_column(col: &ArrayRef) -> Result<Option<ArrayRef>> {
    match cell_type(col.data_type()) {
        Some(target) if &target == col.data_type() => Ok(Some(col.clone())),
        Some(target) => Ok(Some(cast(col, &target)?)),
        None => Ok(None),
    }
}

/// Extract a single cell from a column already cast by [`normalise_column`].
fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| Cell::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| Cell::String(a.value(row).to_string())),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Cell::Integer(a.value(row))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Cell::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| Cell::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(Cell::Null)
}
