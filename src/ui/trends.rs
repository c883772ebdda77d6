//! Trends view rendering.
//!
//! Charts for the headline metrics. Deployment frequency is drawn as bars,
//! the others as lines. A metric missing from the batch gets a placeholder.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::common::format_value;
use crate::app::App;
use crate::data::classify::display_name;
use crate::data::{icon, tone, Series};

/// Charted metrics and whether each is drawn as bars.
const TREND_METRICS: [(&str, bool); 4] = [
    ("api.response_time", false),
    ("cpu.usage", false),
    ("deployment.frequency", true),
    ("error.rate", false),
];

/// Render the four trend charts in a 2x2 grid.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let rows = Layout::vertical([Constraint::Percentage(50); 2]).split(area);
    let top = Layout::horizontal([Constraint::Percentage(50); 2]).split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Percentage(50); 2]).split(rows[1]);
    let cells = [top[0], top[1], bottom[0], bottom[1]];

    for ((name, as_bars), cell) in TREND_METRICS.into_iter().zip(cells) {
        match data.series.get(name) {
            Some(series) if as_bars => render_bars(frame, app, name, series, cell),
            Some(series) => render_series_chart(frame, app, name, series, cell),
            None => render_placeholder(frame, app, name, cell),
        }
    }
}

fn chart_block<'a>(app: &App, name: &str, series: Option<&Series>) -> Block<'a> {
    let latest = series
        .and_then(Series::latest)
        .map(|v| format!(" {} ", format_value(v)))
        .unwrap_or_default();

    Block::default()
        .title(Line::from(vec![
            Span::styled(
                format!(" {} {} ", icon(name), display_name(name)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(latest, app.theme.tone_style(tone(name))),
        ]))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Line chart of one series, oldest point on the left.
pub fn render_series_chart(frame: &mut Frame, app: &App, name: &str, series: &Series, area: Rect) {
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();

    let (lo, hi) = series.bounds().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.1).max(0.5);
    let y_bounds = [lo - pad, hi + pad];
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;

    let first = series.points.first().map(|p| p.time.clone()).unwrap_or_default();
    let last = series.points.last().map(|p| p.time.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .name(name.to_string())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(app.theme.tone_style(tone(name)))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(chart_block(app, name, Some(series)))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(vec![first, last]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(y_bounds)
                .labels(vec![format_value(y_bounds[0]), format_value(y_bounds[1])]),
        )
        .legend_position(None);

    frame.render_widget(chart, area);
}

fn render_bars(frame: &mut Frame, app: &App, name: &str, series: &Series, area: Rect) {
    let style = app.theme.tone_style(tone(name));
    let inner_width = area.width.saturating_sub(2) as usize;

    // Keep the most recent bars that fit at width 3 plus gap
    let fit = (inner_width / 4).max(1);
    let skip = series.len().saturating_sub(fit);

    let bars: Vec<Bar> = series.points[skip..]
        .iter()
        .map(|p| {
            Bar::default()
                .value((p.value.max(0.0) * 100.0).round() as u64)
                .text_value(format_value(p.value))
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(app, name, Some(series)))
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

fn render_placeholder(frame: &mut Frame, app: &App, name: &str, area: Rect) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        " No data in this batch",
        Style::default().add_modifier(Modifier::DIM),
    )))
    .block(chart_block(app, name, None));
    frame.render_widget(paragraph, area);
}
