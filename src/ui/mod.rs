//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`summary`]: Sortable table of every metric with its statistics and trend
//! - [`sections`]: DORA, pipeline, infrastructure and application cards
//! - [`trends`]: Charts for the headline metrics
//! - [`log`]: Most recent raw measurements
//! - [`detail`]: Modal overlay for one metric
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (summary/sections/trends/log)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod detail;
pub mod log;
pub mod sections;
pub mod summary;
pub mod theme;
pub mod trends;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Rows above the first table row: header, tabs, table border and column header.
pub const CONTENT_START_ROW: u16 = 3;

/// Draw the whole dashboard for one frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(area.x, area.y + top, area.width, 5.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Summary => summary::render(frame, app, chunks[2]),
        View::Sections => sections::render(frame, app, chunks[2]),
        View::Trends => trends::render(frame, app, chunks[2]),
        View::Log => log::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, sample_batch};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        screen(&terminal)
    }

    #[test]
    fn test_loading_screen() {
        let mut app = app_with(vec![]);
        let text = render(&mut app, 100, 30);
        assert!(text.contains("DEVDASH"));
        assert!(text.contains("Loading"));
    }

    #[test]
    fn test_too_small() {
        let mut app = app_with(vec![]);
        let text = render(&mut app, 40, 10);
        assert!(text.contains("Terminal too small"));
    }

    #[test]
    fn test_every_view_renders() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        let text = render(&mut app, 120, 40);
        assert!(text.contains("cpu.usage"));
        assert!(text.contains("50.28"));

        app.set_view(View::Sections);
        let text = render(&mut app, 120, 40);
        assert!(text.contains("DORA"));
        assert!(text.contains("Infrastructure"));

        app.set_view(View::Trends);
        let text = render(&mut app, 120, 40);
        assert!(text.contains("API RESPONSE_TIME"));

        app.set_view(View::Log);
        let text = render(&mut app, 120, 40);
        assert!(text.contains("unrelated.metric"));
    }

    #[test]
    fn test_overlays_render() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        app.enter_detail();
        let text = render(&mut app, 120, 40);
        assert!(text.contains("Metric Detail"));

        app.close_overlay();
        app.toggle_help();
        let text = render(&mut app, 120, 40);
        assert!(text.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_stale_marker() {
        let mut app = app_with(vec![Ok(sample_batch()), Err("Request timed out".to_string())]);
        app.reload_data();
        app.reload_data();

        let text = render(&mut app, 120, 40);
        assert!(text.contains("STALE"));
        assert!(text.contains("Request timed out"));
        // Previous data still shown
        assert!(text.contains("cpu.usage"));
    }
}
