//! Detail overlay rendering.
//!
//! Displays a modal overlay with the statistics and chart of one metric.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::common::format_value;
use super::trends::render_series_chart;
use crate::app::App;
use crate::data::classify::display_name;
use crate::data::{classify, icon, tone};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the metric detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref data) = app.data else {
        return;
    };
    let Some(name) = app.selected_metric() else {
        return;
    };
    let Some(stat) = data.summary.get(&name) else {
        return;
    };

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 100);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 40);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(6), // Stats
        Constraint::Min(8),    // Chart
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    let sections: Vec<&str> = classify(&name).iter().map(|c| c.label()).collect();
    let sections = if sections.is_empty() {
        "Uncategorized".to_string()
    } else {
        sections.join(", ")
    };

    let value_style = app.theme.tone_style(tone(&name)).add_modifier(Modifier::BOLD);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let series = data.series.get(&name);

    let header_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} {} ", icon(&name), display_name(&name)),
            bold,
        )]),
        Line::from(vec![
            Span::raw(format!(" {}", name)),
            Span::styled(format!("  [{}]", sections), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Avg: "),
            Span::styled(format_value(stat.avg), value_style),
            Span::raw("    Min: "),
            Span::styled(format_value(stat.min), bold),
            Span::raw("    Max: "),
            Span::styled(format_value(stat.max), bold),
            Span::raw("    Count: "),
            Span::styled(stat.count.to_string(), bold),
            Span::raw("    Charted: "),
            Span::styled(series.map(|s| s.len()).unwrap_or(0).to_string(), bold),
        ]),
    ];

    let header_block = Block::default()
        .title(" Metric Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    match series {
        Some(series) => render_series_chart(frame, app, &name, series, chunks[1]),
        None => {
            // Older than the chart window
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "  Not in the charted window of this batch",
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ])
            .block(
                Block::default()
                    .title(" Trend ")
                    .borders(Borders::ALL)
                    .border_type(app.theme.border_type)
                    .border_style(Style::default().fg(app.theme.border)),
            );
            frame.render_widget(empty, chunks[1]);
        }
    }

    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " ↑/↓ next metric  Esc close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}
