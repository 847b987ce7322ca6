//! Ratatui-based terminal UI.
//!
//! Lists every training series with its chosen ideal function and acceptance
//! count, and charts the selected series: either the training values against
//! the ideal curve, or the classified test points.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_with_tables};
use crate::cli::ViewArgs;
use crate::domain::TableShape;
use crate::error::AppError;
use crate::io::load_series_table;
use crate::report::SeriesSummary;

mod plotters_chart;

use plotters_chart::SeriesChart;

/// Start the TUI.
///
/// Tables are loaded and classified before the terminal switches to the
/// alternate screen, so input errors print normally.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    let training = load_series_table(&args.input.train_path(), args.input.train_shape())?;
    let ideal = load_series_table(&args.input.ideal_path(), args.input.ideal_shape())?;
    let test = load_series_table(&args.input.test_path(), TableShape::Test)?;
    let output = run_with_tables(args.mapping.as_deref(), training, ideal, test)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(output);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// What the chart shows for the selected series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartView {
    /// Test points, accepted ones highlighted.
    Classification,
    /// Training values the ideal function was selected for.
    Training,
}

impl ChartView {
    fn toggle(self) -> Self {
        match self {
            ChartView::Classification => ChartView::Training,
            ChartView::Training => ChartView::Classification,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ChartView::Classification => "test points",
            ChartView::Training => "training",
        }
    }
}

struct App {
    run: RunOutput,
    summaries: Vec<SeriesSummary>,
    selected: usize,
    view: ChartView,
    status: String,
}

impl App {
    fn new(run: RunOutput) -> Self {
        let summaries = run.summaries();
        let status = match run.failed_count() {
            0 => format!("{} series classified", summaries.len()),
            n => format!("{n} of {} series failed to classify", summaries.len()),
        };
        Self {
            run,
            summaries,
            selected: 0,
            view: ChartView::Classification,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.summaries.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('t') => {
                self.view = self.view.toggle();
                self.status = format!("showing {}", self.view.title());
            }
            _ => {}
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("ifit", Style::default().fg(Color::Cyan)),
                Span::raw(" - ideal function fit"),
            ]),
            Line::from(Span::styled(
                format!(
                    "training: {} series x {} rows | ideal: {} candidates | test: {} points",
                    self.run.training.columns().len(),
                    self.run.training.len(),
                    self.run.ideal.columns().len(),
                    self.run.test.len()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(0)])
            .split(area);

        self.draw_series_list(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_series_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .summaries
            .iter()
            .map(|s| match &s.error {
                None => ListItem::new(format!(
                    "{} -> {}  sse={}  {}/{}",
                    s.series,
                    s.ideal_column,
                    s.squared_diff.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string()),
                    s.accepted,
                    s.points
                )),
                Some(_) => ListItem::new(format!("{} -> {}  FAILED", s.series, s.ideal_column))
                    .style(Style::default().fg(Color::Red)),
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Series").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.summaries.get(self.selected) {
            Some(s) => format!("{} vs {} ({})", s.series, s.ideal_column, self.view.title()),
            None => "No series".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if let Some(err) = self.summaries.get(self.selected).and_then(|s| s.error.as_deref()) {
            let msg = Paragraph::new(err.to_string()).style(Style::default().fg(Color::Red));
            frame.render_widget(msg, inner);
            return;
        }

        let Some(data) = chart_data(&self.run, self.selected, self.view) else {
            let msg = Paragraph::new("Nothing to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SeriesChart {
            curve: &data.curve,
            points: &data.points,
            highlight: &data.highlight,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, data.x_bounds, data.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  t training/test  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Series and bounds for one chart.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    curve: Vec<(f64, f64)>,
    points: Vec<(f64, f64)>,
    highlight: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build the chart for the `index`-th classification. `None` when it failed
/// or its columns are missing.
fn chart_data(run: &RunOutput, index: usize, view: ChartView) -> Option<ChartData> {
    let classification = run.classifications.get(index)?;
    let table = classification.outcome.as_ref().ok()?;

    let mut curve = run.ideal.points(&table.ideal_column)?;
    curve.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let (points, highlight) = match view {
        ChartView::Classification => (table.test_points(), table.accepted_points()),
        ChartView::Training => (run.training.points(&table.series)?, Vec::new()),
    };

    let all = || curve.iter().chain(&points);
    let x_bounds = padded_bounds(all().map(|p| p.0));
    let y_bounds = padded_bounds(all().map(|p| p.1));

    Some(ChartData {
        curve,
        points,
        highlight,
        x_bounds,
        y_bounds,
    })
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 1.0, hi + 1.0];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    let label_row = chart.y + chart.height;
    if label_row < inner.y + inner.height - 1 {
        for i in 0..ticks {
            let u = i as f64 / (ticks as f64 - 1.0);
            let label = format!("{:.1}", x_bounds[0] + u * (x_bounds[1] - x_bounds[0]));
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let rect = Rect {
                x: x.saturating_sub(label.len() as u16 / 2),
                y: label_row,
                width: label.len() as u16,
                height: 1,
            };
            frame.render_widget(Paragraph::new(label).style(style), rect);
        }
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = format!("{:.1}", y_bounds[0] + u * (y_bounds[1] - y_bounds[0]));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let start = (inner.x + insets.left.saturating_sub(1)).saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let rect = Rect {
            x: start,
            y,
            width: label.len() as u16,
            height: 1,
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(Paragraph::new("x").alignment(Alignment::Center).style(style), x_rect);
    }

    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(Paragraph::new("y").style(style.add_modifier(Modifier::BOLD)), y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, SeriesTable};

    fn output() -> RunOutput {
        let x = vec![0.0, 1.0, 2.0];
        let training = SeriesTable::new(
            x.clone(),
            vec![Series::new("y1", vec![0.1, 1.1, 2.1]), Series::new("y2", vec![5.0, 5.0, 5.0])],
        )
        .unwrap();
        let ideal = SeriesTable::new(
            x,
            vec![Series::new("y1", vec![0.0, 1.0, 2.0]), Series::new("y2", vec![5.0, 5.0, 5.0])],
        )
        .unwrap();
        let test = SeriesTable::new(vec![2.0, 0.0], vec![Series::new("y", vec![2.5, 9.0])]).unwrap();
        run_with_tables(None, training, ideal, test).unwrap()
    }

    #[test]
    fn keys_move_selection_toggle_and_quit() {
        let mut app = App::new(output());
        assert_eq!(app.summaries.len(), 2);

        assert!(!app.handle_key(KeyCode::Up));
        assert_eq!(app.selected, 0);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, 1);

        app.handle_key(KeyCode::Char('t'));
        assert_eq!(app.view, ChartView::Training);
        app.handle_key(KeyCode::Char('t'));
        assert_eq!(app.view, ChartView::Classification);

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn classification_chart_highlights_accepted_points() {
        let run = output();
        let data = chart_data(&run, 0, ChartView::Classification).unwrap();
        assert_eq!(data.curve, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        // Sorted by x: (0, 9) is rejected, (2, 2.5) is accepted.
        assert_eq!(data.points, vec![(0.0, 9.0), (2.0, 2.5)]);
        assert_eq!(data.highlight, vec![(2.0, 2.5)]);
        assert!(data.y_bounds[0] < 0.0 && data.y_bounds[1] > 9.0);
    }

    #[test]
    fn training_chart_shows_training_values() {
        let run = output();
        let data = chart_data(&run, 1, ChartView::Training).unwrap();
        assert_eq!(data.points, vec![(0.0, 5.0), (1.0, 5.0), (2.0, 5.0)]);
        assert!(data.highlight.is_empty());
        assert!(chart_data(&run, 9, ChartView::Training).is_none());
    }
}
