//! Keyboard and mouse input.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::common::tab_at;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Step through metrics while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Summary),
        KeyCode::Char('2') => app.set_view(View::Sections),
        KeyCode::Char('3') => app.set_view(View::Trends),
        KeyCode::Char('4') => app.set_view(View::Log),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => app.refresh_now(),
        KeyCode::Char('d') => app.emit_demo(),
        KeyCode::Char('e') => app.export_with_feedback(),
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting applies to the Summary table
        KeyCode::Char('s') if app.current_view == View::Summary => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Summary => app.toggle_sort_direction(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.filter_active = false,

        // Keep text but exit input mode
        KeyCode::Esc => app.cancel_filter(),

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => app.filter_push(c),

        _ => {}
    }
}

/// Handle mouse events
///
/// `content_start_row` is the row of the table column header in list views.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Tab bar sits right under the header
            if clicked_row == 1 {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
                return;
            }

            if clicked_row > content_start_row
                && matches!(app.current_view, View::Summary | View::Log)
            {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                if item_row < app.row_count() {
                    app.set_selected_index(item_row);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, sample_batch};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_view_keys() {
        let mut app = app_with(vec![]);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Sections);
        handle_key_event(&mut app, key(KeyCode::Char('4')));
        assert_eq!(app.current_view, View::Log);
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.current_view, View::Summary);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Log);
    }

    #[test]
    fn test_filter_input() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        for c in "err".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        // 'q' is text while filtering
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Backspace));
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert!(!app.filter_active);
        assert_eq!(app.filter_text, "err");
        assert_eq!(app.visible_metrics().len(), 1);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_overlay_and_help_keys() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.show_detail_overlay);
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.selected_index(), 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_detail_overlay);

        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_sort_keys_only_in_summary() {
        let mut app = app_with(vec![]);
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_ne!(app.sort_column, Default::default());

        let column = app.sort_column;
        app.set_view(View::Trends);
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.sort_column, column);
    }

    #[test]
    fn test_mouse_selects_rows_and_tabs() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        handle_mouse_event(&mut app, click(5, 6), 3);
        assert_eq!(app.selected_index(), 2);

        handle_mouse_event(&mut app, click(5, 100), 3);
        assert_eq!(app.selected_index(), 2);

        handle_mouse_event(&mut app, click(16, 1), 3);
        assert_eq!(app.current_view, View::Sections);
    }
}
