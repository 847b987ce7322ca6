//! Classify test points against the ideal column chosen for each training
//! series.
//!
//! For every mapping entry:
//! - sort the test points by `x` (stable)
//! - look up the chosen ideal column at each test `x` (exact match)
//! - accept the point when `|ideal_y - test_y| < sqrt(2)`
//!
//! The acceptance radius is a fixed constant; it does not depend on the
//! selector's squared deviation.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::{
    AnnotatedRow, AnnotatedTable, BestFit, BestFitMapping, SeriesClassification, SeriesTable, TEST_Y_COLUMN,
};
use crate::error::FitError;

/// Test points strictly closer than this to the ideal value are accepted.
pub const ACCEPTANCE_RADIUS: f64 = std::f64::consts::SQRT_2;

/// Build one annotated table per mapping entry.
///
/// Whole-call errors (`Err`) mean no series could be classified: the test
/// table is not `x, y`, or the ideal table repeats an `x`. Problems specific
/// to one series (missing ideal column, test `x` absent from the ideal
/// table) are reported in that series' `outcome` while the others proceed.
pub fn build_annotated_tables(
    ideal: &SeriesTable,
    test: &SeriesTable,
    mapping: &BestFitMapping,
) -> Result<Vec<SeriesClassification>, FitError> {
    let test_points = sorted_test_points(test)?;
    let ideal_index = XIndex::build(ideal)?;

    let out = mapping
        .as_slice()
        .par_iter()
        .map(|fit| SeriesClassification {
            series: fit.test_column.clone(),
            ideal_column: fit.best_fit_col_ideal.clone(),
            outcome: annotate(ideal, &ideal_index, &test_points, fit),
        })
        .collect();

    Ok(out)
}

/// Whether a distance falls inside the acceptance radius.
pub fn is_accepted(distance: f64) -> bool {
    distance < ACCEPTANCE_RADIUS
}

/// Label of an ideal column: its trailing digits (`y42` -> `42`), else the
/// last `_`-separated token.
pub fn ideal_function_number(column: &str) -> String {
    let digits_start = column
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_start {
        Some(i) => column[i..].to_string(),
        None => column.rsplit('_').next().unwrap_or(column).to_string(),
    }
}

fn annotate(
    ideal: &SeriesTable,
    index: &XIndex,
    test_points: &[(f64, f64)],
    fit: &BestFit,
) -> Result<AnnotatedTable, FitError> {
    let column = ideal.column(&fit.best_fit_col_ideal).ok_or_else(|| {
        FitError::invalid(format!(
            "series '{}': ideal column '{}' does not exist",
            fit.test_column, fit.best_fit_col_ideal
        ))
    })?;

    let label = ideal_function_number(&fit.best_fit_col_ideal);
    let mut rows = Vec::with_capacity(test_points.len());

    for &(x, test_y) in test_points {
        let row = index.row(x).ok_or_else(|| FitError::Lookup {
            series: fit.test_column.clone(),
            column: fit.best_fit_col_ideal.clone(),
            x,
        })?;

        let ideal_y = column.values[row];
        let distance = (ideal_y - test_y).abs();

        rows.push(AnnotatedRow {
            x,
            ideal_y,
            test_y,
            distance,
            result: is_accepted(distance),
            ideal_function_number: label.clone(),
        });
    }

    Ok(AnnotatedTable {
        series: fit.test_column.clone(),
        ideal_column: fit.best_fit_col_ideal.clone(),
        rows,
    })
}

/// Test `(x, y)` pairs sorted ascending by `x`; equal `x` keep input order.
fn sorted_test_points(test: &SeriesTable) -> Result<Vec<(f64, f64)>, FitError> {
    let [y] = test.columns() else {
        return Err(FitError::invalid(format!(
            "test table must have exactly one value column, found {}",
            test.columns().len()
        )));
    };
    if y.name != TEST_Y_COLUMN {
        return Err(FitError::invalid(format!(
            "test value column must be named '{TEST_Y_COLUMN}', found '{}'",
            y.name
        )));
    }

    let mut points: Vec<(f64, f64)> = test.x().iter().copied().zip(y.values.iter().copied()).collect();
    // Stable sort; -0.0 and 0.0 compare equal and keep input order.
    points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    Ok(points)
}

/// Exact-match index from ideal `x` to row number.
struct XIndex {
    rows: HashMap<u64, usize>,
}

impl XIndex {
    fn build(ideal: &SeriesTable) -> Result<Self, FitError> {
        let mut rows = HashMap::with_capacity(ideal.len());
        for (row, &x) in ideal.x().iter().enumerate() {
            if rows.insert(key(x), row).is_some() {
                return Err(FitError::invalid(format!(
                    "ideal table has duplicate x={x}; x must identify one row"
                )));
            }
        }
        Ok(Self { rows })
    }

    fn row(&self, x: f64) -> Option<usize> {
        self.rows.get(&key(x)).copied()
    }
}

fn key(x: f64) -> u64 {
    // -0.0 == 0.0 but their bit patterns differ.
    if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() }
}
