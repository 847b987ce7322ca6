//! Best-fit selection: pick, for every training column, the ideal column
//! with the smallest sum of squared deviation.
//!
//! Selection rules:
//! 1. Rows are compared by position (row `i` of training vs. row `i` of
//!    ideal); the `x` values themselves are not compared.
//! 2. The candidate with the minimum `S = Σ (ideal - train)^2` wins.
//! 3. Ties keep the earliest ideal column (strict `<`).
//! 4. An `S` that overflows to infinity is an input error, not a score.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{BestFit, BestFitMapping, SeriesTable};
use crate::error::FitError;
use crate::math::{column_matrix, first_min, squared_deviations};

/// Select the best ideal column for every training column.
///
/// The returned mapping has exactly one entry per training value column, in
/// training column order. Training columns are evaluated in parallel.
pub fn select_best_fits(training: &SeriesTable, ideal: &SeriesTable) -> Result<BestFitMapping, FitError> {
    if training.columns().is_empty() {
        return Err(FitError::empty("training table has no value columns"));
    }
    if ideal.columns().is_empty() {
        return Err(FitError::empty("ideal table has no value columns"));
    }
    if training.is_empty() {
        return Err(FitError::empty("training table has no rows"));
    }
    if ideal.is_empty() {
        return Err(FitError::empty("ideal table has no rows"));
    }
    if training.len() != ideal.len() {
        return Err(FitError::invalid(format!(
            "training has {} rows but ideal has {}; rows are compared by position",
            training.len(),
            ideal.len()
        )));
    }

    let n = ideal.len();
    let candidates = column_matrix(ideal.columns(), n);

    let fits = training
        .columns()
        .par_iter()
        .map(|train| {
            let target = DVector::from_column_slice(&train.values);
            let scores = squared_deviations(&candidates, &target);

            if let Some(idx) = scores.iter().position(|s| !s.is_finite()) {
                return Err(FitError::invalid(format!(
                    "sum of squared deviation between training '{}' and ideal '{}' overflows f64",
                    train.name,
                    ideal.columns()[idx].name
                )));
            }
            let (idx, squared_diff) = first_min(&scores)
                .ok_or_else(|| FitError::empty(format!("no ideal candidates for training '{}'", train.name)))?;

            Ok(BestFit {
                best_fit_col_ideal: ideal.columns()[idx].name.clone(),
                squared_diff,
                test_column: train.name.clone(),
            })
        })
        .collect::<Result<Vec<BestFit>, FitError>>()?;

    BestFitMapping::from_fits(fits)
}
