//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - built once by the loader and borrowed by the selector/classifier
//! - exported to CSV/JSON
//! - reloaded later (a saved best-fit mapping can drive a new classification)

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Name of the shared index column in every series table.
pub const X_COLUMN: &str = "x";

/// Name of the single value column of a test table.
pub const TEST_Y_COLUMN: &str = "y";

/// One named value column of a [`SeriesTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A shared `x` column plus an ordered set of named value columns.
///
/// Invariants (checked by [`SeriesTable::new`]):
/// - every value column has exactly `x.len()` values
/// - column names are unique and never `x`
/// - every cell (including `x`) is finite
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    x: Vec<f64>,
    columns: Vec<Series>,
}

impl SeriesTable {
    pub fn new(x: Vec<f64>, columns: Vec<Series>) -> Result<Self, FitError> {
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(FitError::invalid(format!("non-finite x value at row {i}")));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if col.name == X_COLUMN {
                return Err(FitError::invalid("value column may not be named 'x'"));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(FitError::invalid(format!("duplicate column '{}'", col.name)));
            }
            if col.values.len() != x.len() {
                return Err(FitError::invalid(format!(
                    "column '{}' has {} values but x has {}",
                    col.name,
                    col.values.len(),
                    x.len()
                )));
            }
            if let Some(i) = col.values.iter().position(|v| !v.is_finite()) {
                return Err(FitError::invalid(format!(
                    "column '{}' has a non-finite value at row {i}",
                    col.name
                )));
            }
        }

        Ok(Self { x, columns })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Value columns in table order.
    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y)` pairs of one column in row order, for plotting.
    pub fn points(&self, name: &str) -> Option<Vec<(f64, f64)>> {
        let col = self.column(name)?;
        Some(self.x.iter().copied().zip(col.values.iter().copied()).collect())
    }
}

/// How the loader names value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnNaming {
    /// Use the (normalized) header names.
    Header,
    /// Ignore the header text and use these names, in order.
    Fixed(&'static [&'static str]),
}

/// Expected layout of an input CSV.
///
/// The three observed datasets have fixed widths; `Columns` covers catalogues
/// of any other size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// `x` plus four training series.
    Training,
    /// `x` plus the single observed `y`.
    Test,
    /// `x` plus fifty candidate functions.
    Ideal,
    /// `x` plus `n - 1` value columns (total width `n`).
    Columns(usize),
}

impl TableShape {
    /// Total column count, including `x`.
    pub fn column_count(self) -> usize {
        match self {
            TableShape::Training => 5,
            TableShape::Test => 2,
            TableShape::Ideal => 51,
            TableShape::Columns(n) => n,
        }
    }

    pub fn naming(self) -> ColumnNaming {
        match self {
            TableShape::Test => ColumnNaming::Fixed(&[TEST_Y_COLUMN]),
            TableShape::Training | TableShape::Ideal | TableShape::Columns(_) => ColumnNaming::Header,
        }
    }

    pub fn label(self) -> String {
        match self {
            TableShape::Training => "training".to_string(),
            TableShape::Test => "test".to_string(),
            TableShape::Ideal => "ideal".to_string(),
            TableShape::Columns(n) => format!("{n}-column"),
        }
    }
}

/// The winning ideal column for one training column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestFit {
    pub best_fit_col_ideal: String,
    pub squared_diff: f64,
    pub test_column: String,
}

/// One [`BestFit`] per training column, in training column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BestFit>", into = "Vec<BestFit>")]
pub struct BestFitMapping {
    fits: Vec<BestFit>,
}

impl BestFitMapping {
    /// Build a mapping from entries keyed by `test_column`.
    pub fn from_fits(fits: Vec<BestFit>) -> Result<Self, FitError> {
        let mut seen = HashSet::with_capacity(fits.len());
        for fit in &fits {
            if !seen.insert(fit.test_column.as_str()) {
                return Err(FitError::invalid(format!(
                    "training column '{}' appears twice in the mapping",
                    fit.test_column
                )));
            }
        }
        Ok(Self { fits })
    }

    pub fn get(&self, training_column: &str) -> Option<&BestFit> {
        self.fits.iter().find(|f| f.test_column == training_column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BestFit> {
        self.fits.iter()
    }

    pub fn as_slice(&self) -> &[BestFit] {
        &self.fits
    }

    pub fn len(&self) -> usize {
        self.fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }
}

impl TryFrom<Vec<BestFit>> for BestFitMapping {
    type Error = FitError;

    fn try_from(fits: Vec<BestFit>) -> Result<Self, Self::Error> {
        Self::from_fits(fits)
    }
}

impl From<BestFitMapping> for Vec<BestFit> {
    fn from(mapping: BestFitMapping) -> Self {
        mapping.fits
    }
}

impl<'a> IntoIterator for &'a BestFitMapping {
    type Item = &'a BestFit;
    type IntoIter = std::slice::Iter<'a, BestFit>;

    fn into_iter(self) -> Self::IntoIter {
        self.fits.iter()
    }
}

/// One classified test point.
///
/// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub x: f64,
    pub ideal_y: f64,
    pub test_y: f64,
    pub distance: f64,
    pub result: bool,
    pub ideal_function_number: String,
}

/// All test points of one training series, classified against its ideal column.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTable {
    pub series: String,
    pub ideal_column: String,
    /// Rows in ascending test `x` order.
    pub rows: Vec<AnnotatedRow>,
}

impl AnnotatedTable {
    pub fn accepted(&self) -> impl Iterator<Item = &AnnotatedRow> {
        self.rows.iter().filter(|r| r.result)
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted().count()
    }

    pub fn ideal_points(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (r.x, r.ideal_y)).collect()
    }

    pub fn test_points(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|r| (r.x, r.test_y)).collect()
    }

    pub fn accepted_points(&self) -> Vec<(f64, f64)> {
        self.accepted().map(|r| (r.x, r.test_y)).collect()
    }
}

/// Classification outcome for one mapping entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesClassification {
    pub series: String,
    pub ideal_column: String,
    pub outcome: Result<AnnotatedTable, FitError>,
}

/// A saved best-fit mapping (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub training: String,
    pub ideal: String,
    pub fits: BestFitMapping,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_path: PathBuf,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,

    pub train_shape: TableShape,
    pub ideal_shape: TableShape,

    /// Use this saved mapping instead of running the selector.
    pub mapping_path: Option<PathBuf>,

    /// Directory for `True_Points_*.csv` files.
    pub out_dir: PathBuf,
    /// Directory for SVG plots (`None` disables them).
    pub plot_dir: Option<PathBuf>,

    pub ascii_plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_mapping: Option<PathBuf>,

    /// SQLite database receiving a copy of the input tables.
    pub db_path: Option<PathBuf>,
}
