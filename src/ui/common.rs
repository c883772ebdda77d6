//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay,
//! plus the number formatting used by every view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;
use crate::data::Category;

/// Sparkline characters (8 levels of height).
pub const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Tab titles, in [`View::ALL`] order.
const TAB_TITLES: [&str; 4] = [" 1:Summary ", " 2:Sections ", " 3:Trends ", " 4:Log "];

/// Render the header bar with section counts and batch size.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" DEVDASH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            title,
            Span::raw("│ Loading... │ "),
            Span::styled(app.source_description().to_string(), Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (icon, icon_style) = if app.is_stale() {
        ("●", Style::default().fg(app.theme.warning))
    } else {
        ("●", Style::default().fg(app.theme.success))
    };

    let mut spans = vec![Span::styled(format!(" {}", icon), icon_style), title, Span::raw("│ ")];
    for category in Category::SECTIONS {
        let count = data.section(category).len();
        let style = if count > 0 {
            Style::default().fg(app.theme.category_color(category))
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(count.to_string(), style));
        spans.push(Span::raw(format!(" {} ", category.tag())));
    }
    spans.push(Span::raw("│ "));
    spans.push(Span::styled(
        data.summary.len().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::raw(" metrics │ "));
    spans.push(Span::raw(format!("{} points", format_count(data.total_points as u64))));
    if data.skipped > 0 {
        spans.push(Span::styled(
            format!(" ({} skipped)", data.skipped),
            Style::default().fg(app.theme.warning),
        ));
    }
    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        app.source_description().to_string(),
        Style::default().add_modifier(Modifier::DIM),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let selected = View::ALL.iter().position(|v| *v == app.current_view).unwrap_or(0);

    let tabs = Tabs::new(TAB_TITLES.iter().map(|t| Line::from(*t)))
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// View whose tab covers `column` in the tab bar.
///
/// Mirrors the tab layout: one space of padding each side, one-column divider.
pub fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for (view, title) in View::ALL.iter().zip(TAB_TITLES) {
        let end = start + title.chars().count() as u16 + 2;
        if column < end {
            return Some(*view);
        }
        start = end + 1;
    }
    None
}

/// Render the status bar at the bottom.
///
/// Shows the time since the last update, the stale marker and last error,
/// and the available controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Summary => "/:search s:sort Enter:detail r:refresh d:demo ?:help q:quit",
            View::Sections | View::Trends => "Tab:switch r:refresh d:demo e:export ?:help q:quit",
            View::Log => "/:search Enter:detail r:refresh d:demo ?:help q:quit",
        }
    };

    let line = match (&app.data, &app.load_error) {
        (Some(data), Some(err)) => Line::from(vec![
            Span::styled(" STALE ", Style::default().fg(app.theme.warning).add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "Updated {} ago | {} | {}",
                format_duration(data.last_updated.elapsed()),
                err,
                controls
            )),
        ]),
        (Some(data), None) => Line::from(format!(
            " Updated {} ago | {}",
            format_duration(data.last_updated.elapsed()),
            controls
        )),
        (None, Some(err)) => Line::from(format!(" Error: {} | q:quit r:retry", err)),
        (None, None) => Line::from(" Loading... | q:quit"),
    };

    let paragraph = Paragraph::new(line).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab ←/→     Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Metric detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Summary & Log"),
        Line::from("  /         Filter by name or section"),
        Line::from("  c         Clear filter"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" Collector"),
        Line::from("  r         Refresh now"),
        Line::from("  d         Emit demo data"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 27u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Format large numbers with K/M suffixes
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Two-decimal display of a metric value.
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

/// Render sparkline levels, keeping the last `width` values.
pub fn render_sparkline(levels: &[u8], width: usize) -> String {
    if levels.is_empty() {
        return " ".repeat(width);
    }
    let skip = levels.len().saturating_sub(width);
    levels[skip..]
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}
