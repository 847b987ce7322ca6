//! Synthetic training/ideal/test datasets.
//!
//! The ideal catalogue is a fixed family of closed-form functions sampled on
//! an evenly spaced `x` grid. Training series are noisy copies of a random
//! subset of the catalogue; test points sample those same functions at grid
//! `x` values (so exact-`x` lookups succeed), with a share of outliers.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Series, SeriesTable, TEST_Y_COLUMN};
use crate::error::AppError;

/// Probability that a test point is pushed well outside the acceptance radius.
const OUTLIER_PROB: f64 = 0.2;

/// Number of distinct function shapes in the catalogue.
const FAMILIES: usize = 5;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub rows: usize,
    pub x_start: f64,
    pub x_step: f64,
    pub ideal_count: usize,
    pub training_count: usize,
    pub test_count: usize,
    /// Standard deviation of the Gaussian noise added to training and test values.
    pub noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rows: 400,
            x_start: -20.0,
            x_step: 0.1,
            ideal_count: 50,
            training_count: 4,
            test_count: 100,
            noise: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleData {
    pub training: SeriesTable,
    pub ideal: SeriesTable,
    pub test: SeriesTable,
    /// Ideal column each training column was generated from, in training order.
    pub sources: Vec<String>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleData, AppError> {
    if config.rows == 0 {
        return Err(AppError::new(2, "Row count must be > 0."));
    }
    if config.training_count == 0 || config.training_count > config.ideal_count {
        return Err(AppError::new(
            2,
            format!(
                "Training count must be in 1..={} (the ideal count).",
                config.ideal_count
            ),
        ));
    }
    if !(config.x_start.is_finite() && config.x_step.is_finite() && config.x_step > 0.0) {
        return Err(AppError::new(2, "Invalid x grid for sample generation."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be a finite, non-negative number."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let x: Vec<f64> = (0..config.rows).map(|i| config.x_start + i as f64 * config.x_step).collect();

    let ideal_columns: Vec<Series> = (1..=config.ideal_count)
        .map(|k| Series::new(format!("y{k}"), x.iter().map(|&v| ideal_function(k, v)).collect()))
        .collect();

    let mut picks: Vec<usize> = (0..config.ideal_count).collect();
    picks.shuffle(&mut rng);
    picks.truncate(config.training_count);

    let training_columns: Vec<Series> = picks
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let values = ideal_columns[k].values.iter().map(|v| v + normal.sample(&mut rng)).collect();
            Series::new(format!("y{}", i + 1), values)
        })
        .collect();

    let mut test_points: Vec<(f64, f64)> = (0..config.test_count)
        .map(|_| {
            let row = rng.gen_range(0..config.rows);
            let source = &ideal_columns[picks[rng.gen_range(0..picks.len())]];
            let mut y = source.values[row] + normal.sample(&mut rng);
            if rng.gen_bool(OUTLIER_PROB) {
                let offset = rng.gen_range(3.0..8.0);
                y += if rng.r#gen::<bool>() { offset } else { -offset };
            }
            (x[row], y)
        })
        .collect();
    test_points.shuffle(&mut rng);

    let (test_x, test_y): (Vec<f64>, Vec<f64>) = test_points.into_iter().unzip();

    let sources = picks.iter().map(|&k| ideal_columns[k].name.clone()).collect();
    let training = SeriesTable::new(x.clone(), training_columns)?;
    let ideal = SeriesTable::new(x, ideal_columns)?;
    let test = SeriesTable::new(test_x, vec![Series::new(TEST_Y_COLUMN, test_y)])?;

    Ok(SampleData {
        training,
        ideal,
        test,
        sources,
    })
}

/// The `k`-th (1-based) catalogue function.
///
/// Shapes cycle through five families; the amplitude grows every full cycle,
/// so no two catalogue entries coincide.
pub fn ideal_function(k: usize, x: f64) -> f64 {
    let family = (k - 1) % FAMILIES;
    let a = (1 + (k - 1) / FAMILIES) as f64;
    match family {
        0 => a * x.sin(),
        1 => a * x.cos(),
        2 => a * x + a,
        3 => 0.05 * a * x * x,
        _ => a * x.abs().sqrt(),
    }
}
