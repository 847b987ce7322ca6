//! CSV ingest and validation.
//!
//! Turns a delimited file with a header row into a [`SeriesTable`]. One
//! loader serves every input; the [`TableShape`] passed in decides how many
//! columns are expected and how value columns are named.
//!
//! Design goals:
//! - **Strict schema**: first column `x`, exact column count (exit code 2)
//! - **Line-numbered errors** for unparsable cells, all reported at once
//! - **No fitting logic here**

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ColumnNaming, Series, SeriesTable, TableShape, X_COLUMN};
use crate::error::AppError;

/// Maximum number of row errors quoted in the failure message.
const MAX_REPORTED_ROW_ERRORS: usize = 5;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Load a CSV file as a series table of the given shape.
pub fn load_series_table(path: &Path, shape: TableShape) -> Result<SeriesTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let table = read_series_table(file, shape, &path.display().to_string())?;
    log::info!(
        "loaded {} table '{}': {} rows, {} value columns",
        shape.label(),
        path.display(),
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Parse CSV text from any reader. `source` names the input in error messages.
pub fn read_series_table<R: Read>(reader: R, shape: TableShape, source: &str) -> Result<SeriesTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("{source}: failed to read CSV header: {e}")))?
        .clone();

    let names = value_column_names(&headers, shape, source)?;
    let width = shape.column_count();

    let mut x = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, width) {
            Ok(cells) => {
                x.push(cells[0]);
                for (col, v) in values.iter_mut().zip(&cells[1..]) {
                    col.push(*v);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        return Err(AppError::new(2, format_row_errors(source, &row_errors)));
    }

    let columns = names.into_iter().zip(values).map(|(n, v)| Series::new(n, v)).collect();
    SeriesTable::new(x, columns).map_err(|e| AppError::new(2, format!("{source}: {e}")))
}

fn value_column_names(headers: &StringRecord, shape: TableShape, source: &str) -> Result<Vec<String>, AppError> {
    let expected = shape.column_count();
    if expected < 2 {
        return Err(AppError::new(
            2,
            format!("{source}: a table needs `x` plus at least one value column"),
        ));
    }
    if headers.len() != expected {
        return Err(AppError::new(
            2,
            format!(
                "{source}: expected {expected} columns for a {} table, found {}",
                shape.label(),
                headers.len()
            ),
        ));
    }

    let header: Vec<String> = headers.iter().map(normalize_header_name).collect();
    if header[0] != X_COLUMN {
        return Err(AppError::new(
            2,
            format!("{source}: first column must be `x`, found `{}`", header[0]),
        ));
    }

    match shape.naming() {
        ColumnNaming::Header => {
            if let Some(empty) = header.iter().position(|h| h.is_empty()) {
                return Err(AppError::new(2, format!("{source}: header column {} is empty", empty + 1)));
            }
            Ok(header[1..].to_vec())
        }
        ColumnNaming::Fixed(names) => {
            if names.len() != expected - 1 {
                return Err(AppError::new(
                    2,
                    format!("{source}: {} fixed names for {} value columns", names.len(), expected - 1),
                ));
            }
            Ok(names.iter().map(|n| n.to_string()).collect())
        }
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, width: usize) -> Result<Vec<f64>, String> {
    if record.len() != width {
        return Err(format!("expected {width} fields, found {}", record.len()));
    }
    record
        .iter()
        .enumerate()
        .map(|(i, cell)| parse_f64(cell).ok_or_else(|| format!("column {}: '{cell}' is not a finite number", i + 1)))
        .collect()
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn format_row_errors(source: &str, errors: &[RowError]) -> String {
    let mut out = format!("{source}: {} invalid row(s)", errors.len());
    for e in errors.iter().take(MAX_REPORTED_ROW_ERRORS) {
        out.push_str(&format!("\n  line {}: {}", e.line, e.message));
    }
    if errors.len() > MAX_REPORTED_ROW_ERRORS {
        out.push_str(&format!("\n  ... and {} more", errors.len() - MAX_REPORTED_ROW_ERRORS));
    }
    out
}
