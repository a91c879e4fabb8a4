//! Column previews for a CSV file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use polars::prelude::{Column, DataFrame, DataType};
use serde::Serialize;

use crate::csv::{check_file_size_with_limit, read_csv_table, validate_encoding};
use crate::error::Result;
use crate::upload::MAX_UPLOAD_SIZE;

/// Summary of one CSV column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPreview {
    pub name: String,
    /// Polars dtype inferred from the first 100 rows.
    pub dtype: String,
    /// Ratio of null or blank values (0.0 to 1.0).
    pub null_ratio: f64,
    /// More than 90% of non-blank values parse as numbers.
    pub is_numeric: bool,
    /// Up to `limit` distinct non-blank values, sorted.
    pub samples: Vec<String>,
}

/// Shape and per-column summary of a CSV file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvPreview {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<ColumnPreview>,
}

impl CsvPreview {
    pub fn column(&self, name: &str) -> Option<&ColumnPreview> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

/// Loads `path` and summarizes every column.
pub fn preview_csv(path: &Path, sample_limit: usize) -> Result<CsvPreview> {
    check_file_size_with_limit(path, MAX_UPLOAD_SIZE)?;
    validate_encoding(path)?;
    let df = read_csv_table(path)?;
    Ok(preview_frame(path, &df, sample_limit))
}

fn preview_frame(path: &Path, df: &DataFrame, sample_limit: usize) -> CsvPreview {
    if df.width() > 500 {
        tracing::warn!(
            path = %path.display(),
            columns = df.width(),
            "Dataset has more than 500 columns"
        );
    }

    CsvPreview {
        path: path.to_path_buf(),
        rows: df.height(),
        columns: df
            .get_columns()
            .iter()
            .map(|col| analyze_column(col, sample_limit))
            .collect(),
    }
}

fn analyze_column(col: &Column, sample_limit: usize) -> ColumnPreview {
    let name = col.name().to_string();
    let dtype = col.dtype().to_string();
    let total = col.len();

    let mut blank = 0usize;
    let mut numeric = 0usize;
    let mut samples: BTreeSet<String> = BTreeSet::new();

    let strings = col.cast(&DataType::String).ok();
    match strings.as_ref().and_then(|c| c.str().ok()) {
        Some(chunked) => {
            for value in chunked.iter() {
                let trimmed = value.map(str::trim).unwrap_or_default();
                if trimmed.is_empty() {
                    blank += 1;
                    continue;
                }
                if trimmed.parse::<f64>().is_ok() {
                    numeric += 1;
                }
                if samples.len() < sample_limit {
                    samples.insert(trimmed.to_string());
                }
            }
        }
        None => blank = col.null_count(),
    }

    let non_blank = total.saturating_sub(blank);
    ColumnPreview {
        name,
        dtype,
        null_ratio: if total == 0 {
            0.0
        } else {
            blank as f64 / total as f64
        },
        is_numeric: non_blank > 0 && (numeric as f64 / non_blank as f64) > 0.9,
        samples: samples.into_iter().collect(),
    }
}
