//! CSV ingestion: turns a directory of delimited files into in-memory tables.
//!
//! Each file becomes one [`Table`] named after its stem; each header becomes
//! a column of parsed values. Empty cells are filled with numeric zero so
//! missing data never shortens a column. Files are visited in sorted order so the resulting
//! column list is stable across runs.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};

use crate::{
    data::{DataType, Value, infer_data_type},
    io_utils,
};

#[derive(Debug)]
pub struct Table {
    pub name: String,
    pub columns: Vec<RawColumn>,
}

#[derive(Debug)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Value>,
    pub data_type: DataType,
}

/// Loads every `.csv`/`.tsv` file directly under `dir`.
pub fn load_tables(dir: &Path, delimiter: Option<u8>) -> Result<Vec<Table>> {
    let mut paths = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Reading input directory {dir:?}"))?;
    for entry in entries {
        let path = entry?.path();
        let is_tabular = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv")
            });
        if path.is_file() && is_tabular {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(anyhow!("No CSV files found under {dir:?}"));
    }
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for path in &paths {
        let table = load_table(path, delimiter)
            .with_context(|| format!("Loading table from {path:?}"))?;
        debug!(
            "Loaded table '{}' with {} column(s)",
            table.name,
            table.columns.len()
        );
        tables.push(table);
    }
    Ok(tables)
}

pub fn load_table(path: &Path, delimiter: Option<u8>) -> Result<Table> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("Cannot derive a table name from {path:?}"))?
        .to_string();
    let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;

    let headers = reader
        .headers()
        .with_context(|| format!("Reading headers from {path:?}"))?
        .clone();
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        for (col_idx, cell) in record.iter().enumerate() {
            // fillna(0): an empty cell contributes a zero value.
            let value = Value::parse(cell).unwrap_or(Value::Number(0.0));
            columns[col_idx].push(value);
        }
    }

    let columns = headers
        .iter()
        .zip(columns)
        .map(|(header, values)| {
            if values.is_empty() {
                warn!("Column '{header}' in table '{name}' has no rows");
            }
            let data_type = infer_data_type(&values);
            RawColumn {
                name: header.to_string(),
                values,
                data_type,
            }
        })
        .collect();

    Ok(Table { name, columns })
}
