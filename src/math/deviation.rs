//! Sum of squared deviation between one target column and many candidates.
//!
//! ```text
//! S(c) = Σ_i (candidate_c[i] - target[i])^2
//! ```
//!
//! Candidates are packed once into an `n × m` matrix (one column per
//! candidate) so that every training column reuses the same storage.

use nalgebra::{DMatrix, DVector};

use crate::domain::Series;

/// Pack value columns into an `n × m` matrix, column order preserved.
///
/// Callers guarantee every column has `n` values (a `SeriesTable` invariant).
pub fn column_matrix(columns: &[Series], n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, columns.len(), |i, j| columns[j].values[i])
}

/// Sum of squared deviation of every candidate column from `target`.
///
/// The result has one entry per column of `candidates`, in column order.
pub fn squared_deviations(candidates: &DMatrix<f64>, target: &DVector<f64>) -> Vec<f64> {
    candidates
        .column_iter()
        .map(|candidate| (candidate - target).norm_squared())
        .collect()
}

/// Index of the smallest value; the first one wins on ties.
///
/// Returns `None` for an empty slice.
pub fn first_min(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best
}
