//! SVG plots rendered with Plotters.
//!
//! Two plot families per training series:
//! - `fit_<series>.svg`: ideal curve vs. the training points it was chosen for
//! - `classification_<series>.svg`: ideal curve, all test points, accepted points highlighted

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::AnnotatedTable;
use crate::error::AppError;

/// Pixel size of every SVG plot.
pub const SVG_SIZE: (u32, u32) = (900, 600);

type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// A scatter layer drawn over the ideal curve.
struct Scatter<'a> {
    label: &'a str,
    points: &'a [(f64, f64)],
    color: RGBColor,
    radius: u32,
}

/// Plot a training series against its chosen ideal function.
pub fn write_fit_svg(
    dir: &Path,
    series: &str,
    ideal_column: &str,
    training: &[(f64, f64)],
    ideal: &[(f64, f64)],
) -> Result<PathBuf, AppError> {
    let path = output_path(dir, &format!("fit_{series}.svg"))?;
    let title = format!("Training {series} vs ideal {ideal_column}");
    let layers = [Scatter {
        label: series,
        points: training,
        color: RGBColor(200, 40, 40),
        radius: 2,
    }];

    draw(&path, &title, ideal_column, ideal, &layers)
        .map_err(|e| AppError::new(4, format!("Failed to render '{}': {e}", path.display())))?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

/// Plot the classification of one series' test points.
///
/// `ideal` is the full ideal column; the table only carries its values at test `x`.
pub fn write_classification_svg(dir: &Path, table: &AnnotatedTable, ideal: &[(f64, f64)]) -> Result<PathBuf, AppError> {
    let path = output_path(dir, &format!("classification_{}.svg", table.series))?;
    let title = format!(
        "Test points for {} ({} of {} within sqrt(2) of {})",
        table.series,
        table.accepted_count(),
        table.rows.len(),
        table.ideal_column
    );
    let test = table.test_points();
    let accepted = table.accepted_points();
    let layers = [
        Scatter {
            label: "test",
            points: &test,
            color: RGBColor(150, 150, 150),
            radius: 2,
        },
        Scatter {
            label: "accepted",
            points: &accepted,
            color: RGBColor(20, 160, 60),
            radius: 3,
        },
    ];

    draw(&path, &title, &table.ideal_column, ideal, &layers)
        .map_err(|e| AppError::new(4, format!("Failed to render '{}': {e}", path.display())))?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

fn output_path(dir: &Path, file_name: &str) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create plot dir '{}': {e}", dir.display())))?;
    Ok(dir.join(file_name))
}

fn draw(path: &Path, title: &str, curve_label: &str, curve: &[(f64, f64)], layers: &[Scatter<'_>]) -> DrawResult {
    let mut curve = curve.to_vec();
    curve.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let all = curve.iter().chain(layers.iter().flat_map(|l| l.points.iter()));
    let (x_range, y_range) = bounds(all);

    let root = SVGBackend::new(path, SVG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    let curve_color = RGBColor(30, 90, 200);
    chart
        .draw_series(LineSeries::new(curve.iter().copied(), curve_color.stroke_width(2)))?
        .label(curve_label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], curve_color));

    for layer in layers {
        let color = layer.color;
        let radius = layer.radius;
        chart
            .draw_series(layer.points.iter().map(|&p| Circle::new(p, radius, color.filled())))?
            .label(layer.label)
            .legend(move |(x, y)| Circle::new((x + 10, y), radius, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Padded data bounds; degenerate spans are widened so Plotters gets a non-empty range.
fn bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> (Range<f64>, Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for &(px, py) in points {
        x = (x.0.min(px), x.1.max(px));
        y = (y.0.min(py), y.1.max(py));
    }
    (padded(x), padded(y))
}

fn padded((lo, hi): (f64, f64)) -> Range<f64> {
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0..1.0;
    }
    if hi <= lo {
        return (lo - 1.0)..(hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}
