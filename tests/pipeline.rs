use std::fs;
use std::path::Path;

use ideal_fit::app::pipeline::{run_pipeline, run_with_tables, write_outputs};
use ideal_fit::data::{SampleConfig, SampleData, generate_sample};
use ideal_fit::domain::{RunConfig, Series, SeriesTable, TableShape};
use ideal_fit::error::FitError;
use ideal_fit::io::{IDEAL_TABLE, TEST_TABLE, TRAIN_TABLE, open_store, read_stored_table, write_series_table};

fn sample() -> SampleData {
    generate_sample(&SampleConfig {
        seed: 7,
        rows: 200,
        ideal_count: 15,
        test_count: 60,
        noise: 0.05,
        ..SampleConfig::default()
    })
    .unwrap()
}

fn write_inputs(dir: &Path, data: &SampleData) {
    write_series_table(&dir.join("train.csv"), &data.training).unwrap();
    write_series_table(&dir.join("ideal.csv"), &data.ideal).unwrap();
    write_series_table(&dir.join("test.csv"), &data.test).unwrap();
}

fn config(dir: &Path) -> RunConfig {
    RunConfig {
        train_path: dir.join("train.csv"),
        ideal_path: dir.join("ideal.csv"),
        test_path: dir.join("test.csv"),
        train_shape: TableShape::Training,
        ideal_shape: TableShape::Columns(16),
        mapping_path: None,
        out_dir: dir.join("out"),
        plot_dir: Some(dir.join("plots")),
        ascii_plot: false,
        plot_width: 80,
        plot_height: 20,
        export_mapping: Some(dir.join("mapping.json")),
        db_path: None,
    }
}

#[test]
fn recovers_source_functions_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let data = sample();
    write_inputs(dir.path(), &data);
    let config = config(dir.path());

    let run = run_pipeline(&config).unwrap();

    let chosen: Vec<&str> = run.mapping.iter().map(|f| f.best_fit_col_ideal.as_str()).collect();
    let expected: Vec<&str> = data.sources.iter().map(String::as_str).collect();
    assert_eq!(chosen, expected);
    let training: Vec<&str> = run.mapping.iter().map(|f| f.test_column.as_str()).collect();
    assert_eq!(training, vec!["y1", "y2", "y3", "y4"]);

    assert_eq!(run.classifications.len(), 4);
    for c in &run.classifications {
        let table = c.outcome.as_ref().unwrap();
        assert_eq!(table.rows.len(), 60);
        assert!(table.accepted_count() > 0, "series {} accepted nothing", c.series);
        assert!(table.rows.windows(2).all(|w| w[0].x <= w[1].x));
    }

    let written = write_outputs(&config, &run).unwrap();
    assert_eq!(written.true_points.len(), 4);
    assert_eq!(written.plots.len(), 8);
    for source in &data.sources {
        let path = dir.path().join("out").join(format!("True_Points_{source}.csv"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("x,ideal_y,test_y,distance,result,ideal_function_number"));
        assert!(text.lines().skip(1).all(|l| l.contains(",true,")));
    }
    assert!(dir.path().join("plots").join("fit_y1.svg").exists());
    assert!(dir.path().join("plots").join("classification_y4.svg").exists());
    assert!(dir.path().join("mapping.json").exists());
}

#[test]
fn saved_mapping_reproduces_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &sample());
    let first_config = RunConfig {
        plot_dir: None,
        ..config(dir.path())
    };
    let first = run_pipeline(&first_config).unwrap();
    write_outputs(&first_config, &first).unwrap();

    let second = run_pipeline(&RunConfig {
        mapping_path: Some(dir.path().join("mapping.json")),
        export_mapping: None,
        ..first_config
    })
    .unwrap();

    assert_eq!(second.mapping.len(), first.mapping.len());
    for (a, b) in second.mapping.iter().zip(&first.mapping) {
        assert_eq!(a.test_column, b.test_column);
        assert_eq!(a.best_fit_col_ideal, b.best_fit_col_ideal);
        assert!((a.squared_diff - b.squared_diff).abs() <= 1e-12 * b.squared_diff.max(1.0));
    }
    assert_eq!(second.classifications, first.classifications);
}

#[test]
fn test_x_missing_from_ideal_fails_each_series() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &sample());
    fs::write(dir.path().join("test.csv"), "x,y\n-20,1.0\n1000.5,2.0\n").unwrap();

    let run = run_pipeline(&config(dir.path())).unwrap();
    assert_eq!(run.failed_count(), 4);
    for c in &run.classifications {
        assert!(matches!(&c.outcome, Err(FitError::Lookup { x, .. }) if *x == 1000.5));
    }
}

#[test]
fn input_problems_map_to_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &sample());

    // Missing file.
    let missing = RunConfig {
        test_path: dir.path().join("nope.csv"),
        ..config(dir.path())
    };
    assert_eq!(run_pipeline(&missing).unwrap_err().exit_code(), 2);

    // The ideal file has 16 columns, not the default 51.
    let wrong_shape = RunConfig {
        ideal_shape: TableShape::Ideal,
        ..config(dir.path())
    };
    let err = run_pipeline(&wrong_shape).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("expected 51 columns"));

    // No training rows.
    fs::write(dir.path().join("train.csv"), "x,y1,y2,y3,y4\n").unwrap();
    assert_eq!(run_pipeline(&config(dir.path())).unwrap_err().exit_code(), 3);
}

#[test]
fn database_copy_keeps_the_first_load() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), &sample());
    let config = RunConfig {
        plot_dir: None,
        export_mapping: None,
        db_path: Some(dir.path().join("fit.db")),
        ..config(dir.path())
    };

    let first = run_pipeline(&config).unwrap();

    // A second run over different test points leaves the stored copy alone.
    fs::write(dir.path().join("test.csv"), "x,y\n-20,1.0\n").unwrap();
    let second = run_pipeline(&config).unwrap();
    assert_eq!(second.test.len(), 1);

    let conn = open_store(&dir.path().join("fit.db")).unwrap();
    assert_eq!(read_stored_table(&conn, TRAIN_TABLE).unwrap(), first.training);
    assert_eq!(read_stored_table(&conn, IDEAL_TABLE).unwrap(), first.ideal);
    assert_eq!(read_stored_table(&conn, TEST_TABLE).unwrap(), first.test);
}

#[test]
fn series_sharing_an_ideal_column_export_once() {
    let dir = tempfile::tempdir().unwrap();
    let x = vec![1.0, 2.0, 3.0];
    let training = SeriesTable::new(
        x.clone(),
        vec![Series::new("y1", vec![1.0, 2.0, 3.0]), Series::new("y2", vec![1.5, 2.5, 3.5])],
    )
    .unwrap();
    let ideal = SeriesTable::new(
        x,
        vec![Series::new("y1", vec![1.0, 2.0, 3.0]), Series::new("y2", vec![-9.0, -9.0, -9.0])],
    )
    .unwrap();
    let test = SeriesTable::new(vec![2.0, 3.0], vec![Series::new("y", vec![2.5, 9.0])]).unwrap();

    let run = run_with_tables(None, training, ideal, test).unwrap();
    assert!(run.mapping.iter().all(|f| f.best_fit_col_ideal == "y1"));

    let config = RunConfig {
        plot_dir: None,
        export_mapping: None,
        ..config(dir.path())
    };
    let written = write_outputs(&config, &run).unwrap();
    assert_eq!(written.true_points, vec![dir.path().join("out").join("True_Points_y1.csv")]);

    let text = fs::read_to_string(&written.true_points[0]).unwrap();
    assert_eq!(text.lines().count(), 2);
}
