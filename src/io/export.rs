//! CSV exports.
//!
//! - accepted test points: one file per series, named after the ideal column
//!   it was classified against
//! - whole series tables (`x` plus value columns), readable by the loader

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AnnotatedTable, SeriesTable, X_COLUMN};
use crate::error::AppError;

/// Write a series table as `x,<col1>,<col2>,...`.
///
/// Values use the shortest representation that parses back to the same
/// `f64`, so exact-`x` lookups survive a round trip through disk.
pub fn write_series_table(path: &Path, table: &SeriesTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;

    let header = std::iter::once(X_COLUMN).chain(table.column_names());
    writer
        .write_record(header)
        .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;

    for (i, x) in table.x().iter().enumerate() {
        let row = std::iter::once(x.to_string()).chain(table.columns().iter().map(|c| c.values[i].to_string()));
        writer
            .write_record(row)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// File name of the accepted-points export for an ideal column.
pub fn true_points_file_name(ideal_column: &str) -> String {
    format!("True_Points_{ideal_column}.csv")
}

/// Write the accepted rows of `table` to `<dir>/True_Points_<ideal_column>.csv`.
///
/// Columns follow [`crate::domain::AnnotatedRow`]: `x,ideal_y,test_y,distance,result,ideal_function_number`.
/// Returns the path written.
pub fn write_true_points(dir: &Path, table: &AnnotatedTable) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let path = dir.join(true_points_file_name(&table.ideal_column));
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for row in table.accepted() {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    // A table with no accepted rows still gets its header.
    if table.accepted_count() == 0 {
        writer
            .write_record(["x", "ideal_y", "test_y", "distance", "result", "ideal_function_number"])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    log::info!(
        "wrote {} accepted point(s) for series '{}' to {}",
        table.accepted_count(),
        table.series,
        path.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotatedRow, Series, TableShape};
    use crate::io::load_series_table;

    fn row(x: f64, test_y: f64, result: bool) -> AnnotatedRow {
        AnnotatedRow {
            x,
            ideal_y: 1.0,
            test_y,
            distance: (test_y - 1.0).abs(),
            result,
            ideal_function_number: "7".to_string(),
        }
    }

    #[test]
    fn writes_only_accepted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let table = AnnotatedTable {
            series: "y1".to_string(),
            ideal_column: "y7".to_string(),
            rows: vec![row(1.0, 1.5, true), row(2.0, 9.0, false), row(3.0, 0.25, true)],
        };

        let path = write_true_points(dir.path(), &table).unwrap();
        assert_eq!(path.file_name().unwrap(), "True_Points_y7.csv");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "x,ideal_y,test_y,distance,result,ideal_function_number",
                "1.0,1.0,1.5,0.5,true,7",
                "3.0,1.0,0.25,0.75,true,7",
            ]
        );
    }

    #[test]
    fn series_table_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ideal.csv");
        let table = SeriesTable::new(
            vec![-20.0, -19.9, 0.1 + 0.2],
            vec![
                Series::new("y1", vec![1.0 / 3.0, -0.0, 1e-300]),
                Series::new("y2", vec![2.5, 7.0, -123456.789]),
            ],
        )
        .unwrap();

        write_series_table(&path, &table).unwrap();
        let back = load_series_table(&path, TableShape::Columns(3)).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn empty_acceptance_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let table = AnnotatedTable {
            series: "y2".to_string(),
            ideal_column: "y3".to_string(),
            rows: vec![row(1.0, 9.0, false)],
        };

        let path = write_true_points(dir.path(), &table).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.trim_end(), "x,ideal_y,test_y,distance,result,ideal_function_number");
    }
}
