//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output (golden tests).
//!
//! Plot elements:
//! - ideal function: `-` line
//! - test points: `o`
//! - accepted test points: `*`

use crate::domain::AnnotatedTable;

/// Render one classified series: its ideal curve, the test points and the
/// accepted points.
pub fn render_classification_plot(table: &AnnotatedTable, width: usize, height: usize) -> String {
    let curve = table.ideal_points();
    let marks: Vec<(f64, f64, char)> = table
        .rows
        .iter()
        .map(|r| (r.x, r.test_y, if r.result { '*' } else { 'o' }))
        .collect();

    let title = format!("{} vs ideal {}", table.series, table.ideal_column);
    render_plot(&title, &curve, &marks, width, height)
}

/// Render a curve plus overlay marks. The curve must be in ascending `x`.
pub fn render_plot(title: &str, curve: &[(f64, f64)], marks: &[(f64, f64, char)], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let xs = curve.iter().map(|p| p.0).chain(marks.iter().map(|m| m.0));
    let ys = curve.iter().map(|p| p.1).chain(marks.iter().map(|m| m.1));
    let (x_min, x_max) = span(xs).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(ys).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width,
        height,
    };
    let mut grid = vec![vec![' '; width]; height];

    // Curve first so marks overlay it.
    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in curve {
        let cell = frame.cell(x, y);
        match prev {
            Some(from) => draw_line(&mut grid, from, cell, '-'),
            None => grid[cell.1][cell.0] = '-',
        }
        prev = Some(cell);
    }

    for &(x, y, ch) in marks {
        let (col, row) = frame.cell(x, y);
        // An accepted point is never hidden by a rejected one on the same cell.
        if grid[row][col] != '*' {
            grid[row][col] = ch;
        }
    }

    let mut out = format!("Plot: {title} | x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n");
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    /// Map a data point to `(column, row)`; row 0 is the top (max y).
    fn cell(&self, x: f64, y: f64) -> (usize, usize) {
        let u = ((x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        let v = ((y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        let col = (u * (self.width as f64 - 1.0)).round() as usize;
        let row = ((1.0 - v) * (self.height as f64 - 1.0)).round() as usize;
        (col, row)
    }
}

/// Min/max of a sequence; a single value is widened by one unit each side.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min { Some((min, max)) } else { Some((min - 1.0, max + 1.0)) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let pad = ((max - min).abs() * frac).max(1e-12);
    (min - pad, max + pad)
}

/// Integer line drawing (Bresenham). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x, mut y) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid.get_mut(y as usize).and_then(|r| r.get_mut(x as usize)) {
            if *cell == ' ' {
                *cell = ch;
            }
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
