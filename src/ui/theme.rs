//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{Category, Tone};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights, active elements and primary-tone values.
    pub highlight: Color,
    /// Color for error and failure metrics.
    pub danger: Color,
    /// Color for success and coverage metrics.
    pub success: Color,
    /// Color for deployment and build metrics, and the stale marker.
    pub warning: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            danger: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            danger: Color::Red,
            success: Color::Green,
            warning: Color::Rgb(176, 120, 0),
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a metric tone.
    pub fn tone_color(&self, tone: Tone) -> Color {
        match tone {
            Tone::Danger => self.danger,
            Tone::Success => self.success,
            Tone::Warning => self.warning,
            Tone::Primary => self.highlight,
        }
    }

    /// Style for a metric value in its tone.
    pub fn tone_style(&self, tone: Tone) -> Style {
        let style = Style::default().fg(self.tone_color(tone));
        if tone == Tone::Danger {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Accent color for a section card.
    pub fn category_color(&self, category: Category) -> Color {
        match category {
            Category::Delivery => self.warning,
            Category::Pipeline => self.success,
            Category::Infrastructure => self.highlight,
            Category::Application => Color::Magenta,
            Category::Uncategorized => self.border,
        }
    }
}
