//! Reporting utilities: per-series summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{BestFitMapping, SeriesClassification};

/// One line of the run summary: a training series, its ideal column, and
/// how its test points were classified.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub series: String,
    pub ideal_column: String,
    pub squared_diff: Option<f64>,
    pub points: usize,
    pub accepted: usize,
    /// Set when classification failed for this series.
    pub error: Option<String>,
}

/// Join the selector's mapping with the classifier's outcomes, in mapping order.
pub fn summarize(mapping: &BestFitMapping, classifications: &[SeriesClassification]) -> Vec<SeriesSummary> {
    classifications
        .iter()
        .map(|c| {
            let squared_diff = mapping.get(&c.series).map(|f| f.squared_diff);
            match &c.outcome {
                Ok(table) => SeriesSummary {
                    series: c.series.clone(),
                    ideal_column: c.ideal_column.clone(),
                    squared_diff,
                    points: table.rows.len(),
                    accepted: table.accepted_count(),
                    error: None,
                },
                Err(e) => SeriesSummary {
                    series: c.series.clone(),
                    ideal_column: c.ideal_column.clone(),
                    squared_diff,
                    points: 0,
                    accepted: 0,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}
