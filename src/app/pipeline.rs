//! Shared pipeline logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load tables (optionally copying them to SQLite) -> select best fits (or reuse a saved mapping) -> classify test points
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{BestFitMapping, RunConfig, SeriesClassification, SeriesTable, TableShape};
use crate::error::AppError;
use crate::fit::{build_annotated_tables, select_best_fits};
use crate::io::{
    load_series_table, mapping_file, read_mapping_json, store_inputs, true_points_file_name, write_mapping_json,
    write_true_points,
};
use crate::plot::{write_classification_svg, write_fit_svg};
use crate::report::{SeriesSummary, summarize};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub training: SeriesTable,
    pub ideal: SeriesTable,
    pub test: SeriesTable,
    pub mapping: BestFitMapping,
    /// One entry per mapping entry, in mapping order.
    pub classifications: Vec<SeriesClassification>,
}

impl RunOutput {
    pub fn summaries(&self) -> Vec<SeriesSummary> {
        summarize(&self.mapping, &self.classifications)
    }

    pub fn failed_count(&self) -> usize {
        self.classifications.iter().filter(|c| c.outcome.is_err()).count()
    }
}

/// Files written by [`write_outputs`].
#[derive(Debug, Clone, Default)]
pub struct WrittenFiles {
    pub true_points: Vec<PathBuf>,
    pub plots: Vec<PathBuf>,
    pub mapping: Option<PathBuf>,
}

/// Load a training and an ideal table and select best fits.
pub fn run_selection(
    train_path: &Path,
    train_shape: TableShape,
    ideal_path: &Path,
    ideal_shape: TableShape,
) -> Result<(SeriesTable, SeriesTable, BestFitMapping), AppError> {
    let training = load_series_table(train_path, train_shape)?;
    let ideal = load_series_table(ideal_path, ideal_shape)?;
    let mapping = select_best_fits(&training, &ideal)?;
    log::info!("selected best fits for {} training series", mapping.len());
    Ok((training, ideal, mapping))
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_pipeline(config: &RunConfig) -> Result<RunOutput, AppError> {
    let training = load_series_table(&config.train_path, config.train_shape)?;
    let ideal = load_series_table(&config.ideal_path, config.ideal_shape)?;
    let test = load_series_table(&config.test_path, TableShape::Test)?;

    if let Some(db) = &config.db_path {
        store_inputs(db, &training, &ideal, &test)?;
    }

    run_with_tables(config.mapping_path.as_deref(), training, ideal, test)
}

/// Execute the pipeline on already loaded tables.
///
/// With `saved_mapping`, the selector is skipped and the mapping is read from
/// that JSON file instead. A selector failure aborts the run; a series that
/// fails to classify is logged and reported, and the others proceed.
pub fn run_with_tables(
    saved_mapping: Option<&Path>,
    training: SeriesTable,
    ideal: SeriesTable,
    test: SeriesTable,
) -> Result<RunOutput, AppError> {
    let mapping = match saved_mapping {
        Some(path) => {
            let file = read_mapping_json(path)?;
            log::info!(
                "using saved mapping from {} (generated {} from {})",
                path.display(),
                file.generated_at,
                file.training
            );
            file.fits
        }
        None => {
            let mapping = select_best_fits(&training, &ideal)?;
            log::info!("selected best fits for {} training series", mapping.len());
            mapping
        }
    };

    let classifications = build_annotated_tables(&ideal, &test, &mapping)?;
    for c in &classifications {
        match &c.outcome {
            Ok(table) => log::info!(
                "series '{}' vs '{}': {} of {} test points accepted",
                c.series,
                c.ideal_column,
                table.accepted_count(),
                table.rows.len()
            ),
            Err(e) => log::warn!("skipping series '{}': {e}", c.series),
        }
    }

    Ok(RunOutput {
        training,
        ideal,
        test,
        mapping,
        classifications,
    })
}

/// Write CSV exports, SVG plots and the optional mapping JSON for a run.
///
/// Failed series are skipped; they have nothing to export. Each ideal column
/// is exported once, by the first series matched to it.
pub fn write_outputs(config: &RunConfig, run: &RunOutput) -> Result<WrittenFiles, AppError> {
    let mut written = WrittenFiles::default();
    let mut exported: HashMap<&str, &str> = HashMap::new();

    for c in &run.classifications {
        let Ok(table) = &c.outcome else {
            continue;
        };
        // Series matched to the same ideal column share one export.
        match exported.get(table.ideal_column.as_str()) {
            Some(first) => log::info!(
                "series '{}' shares {} with series '{first}'",
                table.series,
                true_points_file_name(&table.ideal_column)
            ),
            None => {
                written.true_points.push(write_true_points(&config.out_dir, table)?);
                exported.insert(&table.ideal_column, &table.series);
            }
        }

        let Some(plot_dir) = &config.plot_dir else {
            continue;
        };
        let ideal_curve = run.ideal.points(&table.ideal_column).unwrap_or_default();
        match run.training.points(&table.series) {
            Some(training) => {
                written
                    .plots
                    .push(write_fit_svg(plot_dir, &table.series, &table.ideal_column, &training, &ideal_curve)?);
            }
            None => log::warn!("no training column '{}'; skipping its fit plot", table.series),
        }
        written.plots.push(write_classification_svg(plot_dir, table, &ideal_curve)?);
    }

    if let Some(path) = &config.export_mapping {
        let file = mapping_file(&run.mapping, &config.train_path, &config.ideal_path);
        write_mapping_json(path, &file)?;
        written.mapping = Some(path.clone());
    }

    Ok(written)
}
