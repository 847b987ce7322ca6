//! Command-line parsing for the ideal-function fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the selection/classification code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::TableShape;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ifit", version, about = "Match noisy training series to ideal functions and classify test points")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select best fits, classify the test set, print reports and write exports/plots.
    Run(RunArgs),
    /// Print the best-fit mapping only (useful for scripting).
    Select(SelectArgs),
    /// Write a synthetic train/ideal/test CSV triple.
    Generate(GenerateArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same pipeline as `ifit run`, but renders results in a
    /// terminal UI using Ratatui.
    View(ViewArgs),
}

/// Input tables shared by every pipeline command.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Directory holding `train.csv`, `ideal.csv` and `test.csv`.
    #[arg(long, env = "IFIT_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Training CSV (`x,y1..y4`). Defaults to `<data-dir>/train.csv`.
    #[arg(long, value_name = "CSV")]
    pub train: Option<PathBuf>,

    /// Ideal-function CSV (`x,y1..y50`). Defaults to `<data-dir>/ideal.csv`.
    #[arg(long, value_name = "CSV")]
    pub ideal: Option<PathBuf>,

    /// Test CSV (`x,y`). Defaults to `<data-dir>/test.csv`.
    #[arg(long, value_name = "CSV")]
    pub test: Option<PathBuf>,

    /// Total column count of the training CSV, when it is not the usual 5.
    #[arg(long, value_name = "N")]
    pub train_columns: Option<usize>,

    /// Total column count of the ideal CSV, when it is not the usual 51.
    #[arg(long, value_name = "N")]
    pub ideal_columns: Option<usize>,
}

impl InputArgs {
    pub fn train_path(&self) -> PathBuf {
        self.train.clone().unwrap_or_else(|| self.data_dir.join("train.csv"))
    }

    pub fn ideal_path(&self) -> PathBuf {
        self.ideal.clone().unwrap_or_else(|| self.data_dir.join("ideal.csv"))
    }

    pub fn test_path(&self) -> PathBuf {
        self.test.clone().unwrap_or_else(|| self.data_dir.join("test.csv"))
    }

    pub fn train_shape(&self) -> TableShape {
        self.train_columns.map_or(TableShape::Training, TableShape::Columns)
    }

    pub fn ideal_shape(&self) -> TableShape {
        self.ideal_columns.map_or(TableShape::Ideal, TableShape::Columns)
    }
}

/// Options for a full run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reuse a mapping JSON (from `--export-mapping`) instead of running the selector.
    #[arg(long, value_name = "JSON")]
    pub mapping: Option<PathBuf>,

    /// Directory for `True_Points_<ideal>.csv` exports.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Directory for SVG plots.
    #[arg(long, default_value = "plots")]
    pub plot_dir: PathBuf,

    /// Skip writing SVG plots.
    #[arg(long)]
    pub no_plots: bool,

    /// Render an ASCII plot per series in the terminal.
    #[arg(long)]
    pub ascii_plot: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Rows shown per annotated table (0 hides the tables).
    #[arg(long, default_value_t = 10)]
    pub max_rows: usize,

    /// Export the best-fit mapping to JSON.
    #[arg(long = "export-mapping", value_name = "JSON")]
    pub export_mapping: Option<PathBuf>,

    /// Copy the input tables into this SQLite database (tables `train`, `ideal`, `test`).
    #[arg(long, value_name = "SQLITE")]
    pub db: Option<PathBuf>,
}

/// Options for selection only.
#[derive(Debug, Args, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Export the best-fit mapping to JSON.
    #[arg(long = "export-mapping", value_name = "JSON")]
    pub export_mapping: Option<PathBuf>,
}

/// Options for the interactive viewer.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reuse a mapping JSON instead of running the selector.
    #[arg(long, value_name = "JSON")]
    pub mapping: Option<PathBuf>,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output directory for `train.csv`, `ideal.csv` and `test.csv`.
    #[arg(long, env = "IFIT_DATA_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Rows on the shared x grid.
    #[arg(long, default_value_t = 400)]
    pub rows: usize,

    /// First x value of the grid.
    #[arg(long, default_value_t = -20.0, allow_negative_numbers = true)]
    pub x_start: f64,

    /// Spacing of the x grid.
    #[arg(long, default_value_t = 0.1)]
    pub x_step: f64,

    /// Number of ideal functions.
    #[arg(long, default_value_t = 50)]
    pub ideal_count: usize,

    /// Number of training series.
    #[arg(long, default_value_t = 4)]
    pub training_count: usize,

    /// Number of test points.
    #[arg(long, default_value_t = 100)]
    pub test_count: usize,

    /// Standard deviation of the Gaussian noise.
    #[arg(long, default_value_t = 0.3)]
    pub noise: f64,
}
