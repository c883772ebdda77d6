//! Summary view rendering.
//!
//! Displays a table of every metric in the current batch with its section,
//! summary statistics and a sparkline of its series.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::common::{format_value, render_sparkline};
use crate::app::App;
use crate::data::{icon, primary_category, tone, SummaryStat};

/// Width of the trend column in characters.
const TREND_WIDTH: usize = 12;

/// Column to sort by in the Summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Sort by metric name alphabetically.
    #[default]
    Name,
    /// Sort by primary section.
    Section,
    Avg,
    Min,
    Max,
    Count,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Section,
            SortColumn::Section => SortColumn::Avg,
            SortColumn::Avg => SortColumn::Min,
            SortColumn::Min => SortColumn::Max,
            SortColumn::Max => SortColumn::Count,
            SortColumn::Count => SortColumn::Name,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Section => "section",
            SortColumn::Avg => "avg",
            SortColumn::Min => "min",
            SortColumn::Max => "max",
            SortColumn::Count => "count",
        }
    }
}

/// Render the Summary view showing all metrics in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let metrics = app.visible_metrics();

    let header = Row::new(vec![
        Cell::from(format_header("Metric", SortColumn::Name, app)),
        Cell::from(format_header("Section", SortColumn::Section, app)),
        Cell::from(format_header("Avg", SortColumn::Avg, app)),
        Cell::from(format_header("Min", SortColumn::Min, app)),
        Cell::from(format_header("Max", SortColumn::Max, app)),
        Cell::from(format_header("Count", SortColumn::Count, app)),
        Cell::from("Trend"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = metrics
        .iter()
        .map(|(name, stat)| {
            let value_style = app.theme.tone_style(tone(name));
            let category = primary_category(name);
            let sparkline = data
                .series
                .get(*name)
                .map(|s| render_sparkline(&s.sparkline(), TREND_WIDTH))
                .unwrap_or_default();

            Row::new(vec![
                Cell::from(format!("{} {}", icon(name), name)),
                Cell::from(category.tag())
                    .style(Style::default().fg(app.theme.category_color(category))),
                Cell::from(format_value(stat.avg)).style(value_style),
                Cell::from(format_value(stat.min)),
                Cell::from(format_value(stat.max)),
                Cell::from(stat.count.to_string()),
                Cell::from(sparkline).style(value_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),                        // Metric
        Constraint::Length(8),                      // Section
        Constraint::Fill(1),                        // Avg
        Constraint::Fill(1),                        // Min
        Constraint::Fill(1),                        // Max
        Constraint::Length(7),                      // Count
        Constraint::Length(TREND_WIDTH as u16 + 1), // Trend
    ];

    let selected_visual_index = app.selected_index().min(metrics.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let position_info = if !metrics.is_empty() {
        format!(" [{}/{}]", selected_visual_index + 1, metrics.len())
    } else {
        String::new()
    };

    let title = format!(
        " Metrics ({}/{}) [s:sort {}{}]{}{} ",
        metrics.len(),
        data.summary.len(),
        app.sort_column.label(),
        sort_dir,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected_visual_index));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort metrics by the given column and direction. Ties fall back to name.
pub fn sort_metrics_by(metrics: &mut [(&str, &SummaryStat)], column: SortColumn, ascending: bool) {
    metrics.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.0.cmp(b.0),
            SortColumn::Section => primary_category(a.0).cmp(&primary_category(b.0)),
            SortColumn::Avg => a.1.avg.total_cmp(&b.1.avg),
            SortColumn::Min => a.1.min.total_cmp(&b.1.min),
            SortColumn::Max => a.1.max.total_cmp(&b.1.max),
            SortColumn::Count => a.1.count.cmp(&b.1.count),
        };

        let primary = if ascending { primary } else { primary.reverse() };

        if primary == Ordering::Equal {
            a.0.cmp(b.0)
        } else {
            primary
        }
    });
}
