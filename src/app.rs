//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments
//! - runs selection + classification
//! - prints reports/plots
//! - writes exports

use std::fs;

use clap::Parser;

use crate::cli::{Command, GenerateArgs, RunArgs, SelectArgs, ViewArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::io::{mapping_file, write_mapping_json, write_series_table};

pub mod pipeline;

/// Entry point for the `ifit` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing: `IFIT_DATA_DIR` may come from `.env`.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Select(args) => handle_select(args),
        Command::Generate(args) => handle_generate(args),
        Command::View(args) => handle_view(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&config, &run.training, &run.ideal, &run.test)
    );
    println!("{}", crate::report::format_best_fits(&run.mapping));
    println!("{}", crate::report::format_summaries(&run.summaries()));

    for c in &run.classifications {
        let Ok(table) = &c.outcome else {
            continue;
        };
        if args.max_rows > 0 {
            println!("{}", crate::report::format_annotated_table(table, args.max_rows));
        }
        if config.ascii_plot {
            println!(
                "{}",
                crate::plot::render_classification_plot(table, config.plot_width, config.plot_height)
            );
        }
    }

    let written = pipeline::write_outputs(&config, &run)?;
    for path in written.true_points.iter().chain(&written.plots).chain(&written.mapping) {
        println!("wrote {}", path.display());
    }

    let failed = run.failed_count();
    if failed > 0 && failed == run.classifications.len() {
        return Err(AppError::new(4, "No series could be classified."));
    }
    Ok(())
}

fn handle_select(args: SelectArgs) -> Result<(), AppError> {
    let train_path = args.input.train_path();
    let ideal_path = args.input.ideal_path();
    let (_, _, mapping) =
        pipeline::run_selection(&train_path, args.input.train_shape(), &ideal_path, args.input.ideal_shape())?;

    println!("{}", crate::report::format_best_fits(&mapping));

    if let Some(path) = &args.export_mapping {
        write_mapping_json(path, &mapping_file(&mapping, &train_path, &ideal_path))?;
    }
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        seed: args.seed,
        rows: args.rows,
        x_start: args.x_start,
        x_step: args.x_step,
        ideal_count: args.ideal_count,
        training_count: args.training_count,
        test_count: args.test_count,
        noise: args.noise,
    };
    let sample = generate_sample(&config)?;

    fs::create_dir_all(&args.out_dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", args.out_dir.display())))?;

    for (name, table) in [("train.csv", &sample.training), ("ideal.csv", &sample.ideal), ("test.csv", &sample.test)] {
        let path = args.out_dir.join(name);
        write_series_table(&path, table)?;
        println!("wrote {}", path.display());
    }

    log::info!("training series were drawn from ideal columns {:?}", sample.sources);
    Ok(())
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        train_path: args.input.train_path(),
        ideal_path: args.input.ideal_path(),
        test_path: args.input.test_path(),
        train_shape: args.input.train_shape(),
        ideal_shape: args.input.ideal_shape(),
        mapping_path: args.mapping.clone(),
        out_dir: args.out_dir.clone(),
        plot_dir: (!args.no_plots).then(|| args.plot_dir.clone()),
        ascii_plot: args.ascii_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_mapping: args.export_mapping.clone(),
        db_path: args.db.clone(),
    }
}

/// Rewrite argv so `ifit` defaults to `ifit run`.
///
/// Rules:
/// - `ifit`                      -> `ifit run`
/// - `ifit --train a.csv ...`    -> `ifit run --train a.csv ...`
/// - `ifit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
