//! Log view rendering.
//!
//! The head of the current batch as received, newest first.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::common::format_value;
use crate::app::App;
use crate::data::{icon, primary_category, tone};

/// Render the raw measurement log.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let entries = app.visible_log();

    let header = Row::new(vec!["ID", "Time", "Metric", "Section", "Value"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = entries
        .iter()
        .map(|m| {
            let category = primary_category(&m.name);
            Row::new(vec![
                Cell::from(m.id.to_string()),
                Cell::from(m.when.with_timezone(&Local).format("%H:%M:%S").to_string()),
                Cell::from(format!("{} {}", icon(&m.name), m.name)),
                Cell::from(category.tag())
                    .style(Style::default().fg(app.theme.category_color(category))),
                Cell::from(format_value(m.value)).style(app.theme.tone_style(tone(&m.name))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Fill(3),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let selected = app.selected_index().min(entries.len().saturating_sub(1));
    let filter_info = if app.filter_text.is_empty() {
        String::new()
    } else {
        format!(" /{}/", app.filter_text)
    };

    let title = format!(
        " Recent measurements ({} of {}){} ",
        entries.len(),
        data.total_points,
        filter_info
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
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
