//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the selector/classifier code stays clean and testable
//! - output changes are localized

use crate::domain::{AnnotatedTable, BestFitMapping, RunConfig, SeriesTable};
use crate::report::SeriesSummary;

/// Format the run header (inputs and table sizes).
pub fn format_run_summary(config: &RunConfig, training: &SeriesTable, ideal: &SeriesTable, test: &SeriesTable) -> String {
    let mut out = String::new();

    out.push_str("=== ifit - Ideal Function Fit ===\n");
    out.push_str(&format!(
        "Training: {} | rows={} | series={}\n",
        config.train_path.display(),
        training.len(),
        training.columns().len()
    ));
    out.push_str(&format!(
        "Ideal:    {} | rows={} | candidates={}\n",
        config.ideal_path.display(),
        ideal.len(),
        ideal.columns().len()
    ));
    out.push_str(&format!("Test:     {} | points={}\n", config.test_path.display(), test.len()));
    if let Some(path) = &config.mapping_path {
        out.push_str(&format!("Mapping:  {} (selector skipped)\n", path.display()));
    }
    if let Some(path) = &config.db_path {
        out.push_str(&format!("Database: {}\n", path.display()));
    }
    out.push('\n');

    out
}

/// Format the selector's mapping as a table.
pub fn format_best_fits(mapping: &BestFitMapping) -> String {
    let mut out = String::new();

    out.push_str("Best fits (minimum sum of squared deviation):\n");
    push_row(&mut out, format!("{:<12} {:<12} {:>16}", "training", "ideal", "squared_diff"));
    push_row(&mut out, format!("{:-<12} {:-<12} {:-<16}", "", "", ""));

    for fit in mapping {
        push_row(
            &mut out,
            format!(
                "{:<12} {:<12} {:>16.6}",
                truncate(&fit.test_column, 12),
                truncate(&fit.best_fit_col_ideal, 12),
                fit.squared_diff
            ),
        );
    }

    out
}

/// Format the per-series classification summary.
pub fn format_summaries(rows: &[SeriesSummary]) -> String {
    let mut out = String::new();

    out.push_str("Classification (acceptance radius sqrt(2)):\n");
    push_row(
        &mut out,
        format!("{:<12} {:<12} {:>8} {:>9} {}", "training", "ideal", "points", "accepted", "status"),
    );
    push_row(&mut out, format!("{:-<12} {:-<12} {:-<8} {:-<9} {:-<6}", "", "", "", "", ""));

    for r in rows {
        let status = match &r.error {
            Some(e) => format!("FAILED: {e}"),
            None => "ok".to_string(),
        };
        push_row(
            &mut out,
            format!(
                "{:<12} {:<12} {:>8} {:>9} {}",
                truncate(&r.series, 12),
                truncate(&r.ideal_column, 12),
                r.points,
                r.accepted,
                status
            ),
        );
    }

    out
}

/// Format an annotated table, showing at most `max_rows` rows.
pub fn format_annotated_table(table: &AnnotatedTable, max_rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Series {} vs ideal {} ({} of {} accepted):\n",
        table.series,
        table.ideal_column,
        table.accepted_count(),
        table.rows.len()
    ));
    push_row(
        &mut out,
        format!("{:>10} {:>12} {:>12} {:>10} {:<6}", "x", "ideal_y", "test_y", "distance", "result"),
    );
    push_row(&mut out, format!("{:-<10} {:-<12} {:-<12} {:-<10} {:-<6}", "", "", "", "", ""));

    for r in table.rows.iter().take(max_rows) {
        push_row(
            &mut out,
            format!(
                "{:>10.3} {:>12.4} {:>12.4} {:>10.4} {:<6}",
                r.x,
                r.ideal_y,
                r.test_y,
                r.distance,
                if r.result { "yes" } else { "no" }
            ),
        );
    }
    if table.rows.len() > max_rows {
        out.push_str(&format!("... {} more row(s)\n", table.rows.len() - max_rows));
    }

    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotatedRow, BestFit};

    #[test]
    fn best_fit_table_layout() {
        let mapping = BestFitMapping::from_fits(vec![BestFit {
            best_fit_col_ideal: "y42".to_string(),
            squared_diff: 33.5,
            test_column: "y1".to_string(),
        }])
        .unwrap();

        let text = format_best_fits(&mapping);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "training     ideal            squared_diff");
        assert_eq!(lines[3], "y1           y42                 33.500000");
    }

    #[test]
    fn summary_shows_failures() {
        let rows = vec![SeriesSummary {
            series: "y4".to_string(),
            ideal_column: "y50".to_string(),
            squared_diff: Some(1.0),
            points: 0,
            accepted: 0,
            error: Some("boom".to_string()),
        }];
        let text = format_summaries(&rows);
        assert!(text.lines().last().unwrap().ends_with("FAILED: boom"));
    }

    #[test]
    fn annotated_table_is_capped() {
        let row = |x: f64| AnnotatedRow {
            x,
            ideal_y: 1.0,
            test_y: 1.5,
            distance: 0.5,
            result: true,
            ideal_function_number: "1".to_string(),
        };
        let table = AnnotatedTable {
            series: "y1".to_string(),
            ideal_column: "y1".to_string(),
            rows: vec![row(1.0), row(2.0), row(3.0)],
        };

        let text = format_annotated_table(&table, 2);
        assert!(text.starts_with("Series y1 vs ideal y1 (3 of 3 accepted):"));
        assert!(text.contains("     1.000       1.0000       1.5000     0.5000 yes"));
        assert!(text.ends_with("... 1 more row(s)\n"));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
