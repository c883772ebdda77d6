//! Sections view rendering.
//!
//! One card per dashboard section (DORA, pipeline, infrastructure,
//! application) listing its metrics with their latest and average values,
//! followed by the top metrics by average.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use super::common::format_value;
use crate::app::App;
use crate::data::classify::display_name;
use crate::data::{icon, tone, Category, DashboardSnapshot};

/// Render the four section cards and the top-by-average ranking.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let rows = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Percentage(35),
        Constraint::Min(6),
    ])
    .split(area);
    let top_cards = Layout::horizontal([Constraint::Percentage(50); 2]).split(rows[0]);
    let bottom_cards = Layout::horizontal([Constraint::Percentage(50); 2]).split(rows[1]);
    let card_areas = [top_cards[0], top_cards[1], bottom_cards[0], bottom_cards[1]];

    let selected = app.selected_section();
    for (category, card_area) in Category::SECTIONS.into_iter().zip(card_areas) {
        render_card(frame, app, data, category, category == selected, card_area);
    }

    render_top(frame, app, data, rows[2]);
}

fn render_card(
    frame: &mut Frame,
    app: &App,
    data: &DashboardSnapshot,
    category: Category,
    selected: bool,
    area: Rect,
) {
    let names = data.section(category);
    let accent = app.theme.category_color(category);

    let border_style = if selected {
        Style::default().fg(accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.border)
    };

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ({}) ", category.label(), names.len()),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    let lines: Vec<Line> = if names.is_empty() {
        vec![Line::from(Span::styled(
            " No metrics in this batch",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        names
            .iter()
            .filter_map(|name| {
                let stat = data.summary.get(name)?;
                let latest = data
                    .series
                    .get(name)
                    .and_then(|s| s.latest())
                    .map(format_value)
                    .unwrap_or_else(|| "-".to_string());
                Some(Line::from(vec![
                    Span::raw(format!(" {} ", icon(name))),
                    Span::styled(
                        format!("{:<28}", display_name(name)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("{:>10}", latest), app.theme.tone_style(tone(name))),
                    Span::styled(
                        format!("  avg {}", format_value(stat.avg)),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                ]))
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_top(frame: &mut Frame, app: &App, data: &DashboardSnapshot, area: Rect) {
    let block = Block::default()
        .title(" Top by average ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if data.top.is_empty() {
        frame.render_widget(Paragraph::new(" No data").block(block), area);
        return;
    }

    // Bar heights are relative, so negative averages sit at zero
    let bars: Vec<Bar> = data
        .top
        .iter()
        .map(|(name, avg)| {
            Bar::default()
                .label(Line::from(name.clone()))
                .value((avg.max(0.0) * 100.0).round() as u64)
                .text_value(format_value(*avg))
                .style(app.theme.tone_style(tone(name)))
        })
        .collect();

    let count = data.top.len() as u16;
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / count.max(1)).saturating_sub(1).clamp(1, 24);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);

    frame.render_widget(chart, area);
}
