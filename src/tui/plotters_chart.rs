//! Plotters-powered series chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SeriesChart<'a> {
    /// The ideal function, ascending in `x`.
    pub curve: &'a [(f64, f64)],
    /// Training values or test points.
    pub points: &'a [(f64, f64)],
    /// Accepted test points (a subset of `points`).
    pub highlight: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution; axes only.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let curve_color = RGBColor(0, 255, 255);
            let points_color = RGBColor(160, 160, 160);
            let highlight_color = RGBColor(0, 255, 0);

            chart.draw_series(LineSeries::new(self.curve.iter().copied(), &curve_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; pixels render cleanly.
            chart.draw_series(self.points.iter().map(|&p| Pixel::new(p, points_color)))?;
            chart.draw_series(self.highlight.iter().map(|&p| Pixel::new(p, highlight_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
