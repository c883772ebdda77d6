//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{classify, Category, DashboardSnapshot, EngineOptions, SummaryStat};
use crate::source::{DataSource, Measurement};
use crate::ui::summary::{sort_metrics_by, SortColumn};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Metric detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every metric with its summary statistics.
    Summary,
    /// DORA, pipeline, infrastructure and application cards.
    Sections,
    /// Charts for the headline metrics.
    Trends,
    /// Most recent raw measurements.
    Log,
}

impl View {
    pub const ALL: [View; 4] = [View::Summary, View::Sections, View::Trends, View::Log];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Summary => View::Sections,
            View::Sections => View::Trends,
            View::Trends => View::Log,
            View::Log => View::Summary,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Summary => View::Log,
            View::Sections => View::Summary,
            View::Trends => View::Sections,
            View::Log => View::Trends,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Sections => "Sections",
            View::Trends => "Trends",
            View::Log => "Log",
        }
    }

    fn index(self) -> usize {
        match self {
            View::Summary => 0,
            View::Sections => 1,
            View::Trends => 2,
            View::Log => 3,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<DashboardSnapshot>,
    pub load_error: Option<String>,
    pub options: EngineOptions,

    // Navigation state, one cursor per view
    selected: [usize; 4],

    // Sorting (Summary view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,
    pub export_path: std::path::PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App, picking a theme from the terminal background.
    pub fn new(source: Box<dyn DataSource>, options: EngineOptions) -> Self {
        Self::with_theme(source, options, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(source: Box<dyn DataSource>, options: EngineOptions, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Summary,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            load_error: None,
            options,
            selected: [0; 4],
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            theme,
            export_path: "devdash_export.json".into(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for a new batch.
    ///
    /// A new batch replaces the snapshot wholesale. When the source reports an
    /// error the previous snapshot stays on screen and is marked stale.
    /// Returns `true` if a new snapshot was derived.
    pub fn reload_data(&mut self) -> bool {
        let batch = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(batch) = batch else {
            return false;
        };

        self.data = Some(DashboardSnapshot::from_batch(&batch, &self.options));
        self.clamp_selection();
        true
    }

    /// Whether the displayed snapshot predates a failed refresh.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.load_error.is_some()
    }

    /// Ask the source for a fresh batch right away.
    pub fn refresh_now(&mut self) {
        self.source.refresh_now();
        self.reload_data();
        self.set_status_message("Refresh requested".to_string());
    }

    /// Ask the collector for demo measurements.
    pub fn emit_demo(&mut self) {
        let message = if self.source.emit_demo() {
            "Demo data requested"
        } else {
            "Demo data needs a live collector"
        };
        self.set_status_message(message.to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    /// Cursor position in the current view.
    pub fn selected_index(&self) -> usize {
        self.selected[self.current_view.index()]
    }

    /// Move the cursor in the current view, clamped to its rows.
    pub fn set_selected_index(&mut self, index: usize) {
        let max = self.row_count().saturating_sub(1);
        self.selected[self.current_view.index()] = index.min(max);
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        self.set_selected_index(self.selected_index().saturating_add(n));
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.set_selected_index(self.selected_index().saturating_sub(n));
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.set_selected_index(0);
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.set_selected_index(usize::MAX);
    }

    /// Number of selectable rows in the current view.
    pub fn row_count(&self) -> usize {
        self.row_count_for(self.current_view)
    }

    fn row_count_for(&self, view: View) -> usize {
        match view {
            View::Summary => self.visible_metrics().len(),
            View::Sections => Category::SECTIONS.len(),
            View::Trends => 0,
            View::Log => self.visible_log().len(),
        }
    }

    fn clamp_selection(&mut self) {
        for view in View::ALL {
            let max = self.row_count_for(view).saturating_sub(1);
            let index = &mut self.selected[view.index()];
            *index = (*index).min(max);
        }
    }

    /// Metrics shown in the Summary view, filtered and sorted.
    pub fn visible_metrics(&self) -> Vec<(&str, &SummaryStat)> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        let mut metrics: Vec<(&str, &SummaryStat)> = data
            .summary
            .iter()
            .map(|(name, stat)| (name.as_str(), stat))
            .filter(|(name, _)| self.matches_filter(name))
            .collect();
        sort_metrics_by(&mut metrics, self.sort_column, self.sort_ascending);
        metrics
    }

    /// Raw measurements shown in the Log view, newest first.
    pub fn visible_log(&self) -> Vec<&Measurement> {
        let Some(ref data) = self.data else {
            return Vec::new();
        };
        data.recent.iter().filter(|m| self.matches_filter(&m.name)).collect()
    }

    /// The section highlighted in the Sections view.
    pub fn selected_section(&self) -> Category {
        Category::SECTIONS[self.selected[View::Sections.index()].min(Category::SECTIONS.len() - 1)]
    }

    /// Name of the metric under the cursor, if the current view has one.
    pub fn selected_metric(&self) -> Option<String> {
        let index = self.selected_index();
        match self.current_view {
            View::Summary => self.visible_metrics().get(index).map(|(name, _)| name.to_string()),
            View::Log => self.visible_log().get(index).map(|m| m.name.clone()),
            View::Sections | View::Trends => None,
        }
    }

    /// Open the detail overlay for the metric under the cursor.
    pub fn enter_detail(&mut self) {
        if self.selected_metric().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to Summary.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
            return;
        }
        if self.current_view != View::Summary {
            self.set_view(View::Summary);
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.clamp_selection();
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Check if a metric name matches the current filter.
    ///
    /// Matches on the name or on a section label, so `/dora` lists delivery metrics.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        let search = self.filter_text.to_lowercase();
        name.to_lowercase().contains(&search)
            || classify(name)
                .iter()
                .any(|c| c.label().to_lowercase().contains(&search))
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current snapshot to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        data.export_to(path)
    }

    /// Export to the configured path and report the outcome in the status bar.
    pub fn export_with_feedback(&mut self) {
        let path = self.export_path.clone();
        let message = match self.export_state(&path) {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(e) => format!("Export failed: {}", e),
        };
        self.set_status_message(message);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::Batch;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::collections::VecDeque;
    use tempfile::tempdir;

    /// Source that replays scripted poll results.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedSource {
        polls: VecDeque<Result<Batch, String>>,
        error: Option<String>,
        pub refreshes: usize,
        pub demo_supported: bool,
    }

    impl ScriptedSource {
        pub fn new(polls: Vec<Result<Batch, String>>) -> Self {
            Self {
                polls: polls.into(),
                ..Default::default()
            }
        }
    }

    impl DataSource for ScriptedSource {
        fn poll(&mut self) -> Option<Batch> {
            match self.polls.pop_front()? {
                Ok(batch) => {
                    self.error = None;
                    Some(batch)
                }
                Err(e) => {
                    self.error = Some(e);
                    None
                }
            }
        }

        fn description(&self) -> &str {
            "scripted"
        }

        fn error(&self) -> Option<&str> {
            self.error.as_deref()
        }

        fn refresh_now(&mut self) {
            self.refreshes += 1;
        }

        fn emit_demo(&mut self) -> bool {
            self.demo_supported
        }
    }

    pub(crate) fn sample_batch() -> Batch {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let entries = [
            ("cpu.usage", 45.0),
            ("error.rate", 1.5),
            ("api.response_time", 120.0),
            ("deployment.frequency", 3.0),
            ("cpu.usage", 55.555),
            ("build.success.rate", 98.0),
            ("unrelated.metric", 7.0),
        ];
        entries
            .iter()
            .enumerate()
            .map(|(i, (name, value))| {
                Measurement::new(
                    (entries.len() - i) as i64,
                    *name,
                    *value,
                    t0 - ChronoDuration::seconds(i as i64),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub(crate) fn app_with(polls: Vec<Result<Batch, String>>) -> App {
        App::with_theme(
            Box::new(ScriptedSource::new(polls)),
            EngineOptions::default(),
            Theme::dark(),
        )
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Summary;
        for _ in 0..4 {
            view = view.next();
        }
        assert_eq!(view, View::Summary);
        assert_eq!(View::Summary.prev(), View::Log);
        assert_eq!(View::Trends.prev().next(), View::Trends);
    }

    #[test]
    fn test_reload_replaces_snapshot() {
        let mut app = app_with(vec![
            Ok(sample_batch()),
            Ok(vec![Measurement::new(1, "memory.usage", 1.0, Utc::now())].into()),
        ]);
        assert!(app.data.is_none());

        assert!(app.reload_data());
        assert!(app.data.as_ref().unwrap().summary.contains_key("cpu.usage"));

        assert!(app.reload_data());
        let data = app.data.as_ref().unwrap();
        assert_eq!(data.summary.len(), 1);
        assert!(!data.summary.contains_key("cpu.usage"));

        // Nothing new
        assert!(!app.reload_data());
    }

    #[test]
    fn test_failure_keeps_stale_snapshot() {
        let mut app = app_with(vec![
            Ok(sample_batch()),
            Err("Connection failed: refused".to_string()),
            Ok(sample_batch()),
        ]);

        app.reload_data();
        assert!(!app.is_stale());

        assert!(!app.reload_data());
        assert!(app.data.is_some());
        assert!(app.is_stale());
        assert_eq!(app.load_error.as_deref(), Some("Connection failed: refused"));

        assert!(app.reload_data());
        assert!(!app.is_stale());
    }

    #[test]
    fn test_failure_before_first_batch() {
        let mut app = app_with(vec![Err("Request timed out".to_string())]);
        app.reload_data();
        assert!(app.data.is_none());
        assert!(!app.is_stale());
        assert!(app.load_error.is_some());
    }

    #[test]
    fn test_visible_metrics_sort_and_filter() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        let names: Vec<&str> = app.visible_metrics().iter().map(|(n, _)| *n).collect();
        assert_eq!(names[0], "api.response_time");
        assert_eq!(names.len(), 6);

        app.sort_column = SortColumn::Avg;
        app.sort_ascending = false;
        assert_eq!(app.visible_metrics()[0].0, "api.response_time");
        assert_eq!(app.visible_metrics()[1].0, "build.success.rate");

        app.filter_text = "cpu".to_string();
        assert_eq!(app.visible_metrics().len(), 1);

        app.filter_text = "dora".to_string();
        let names: Vec<&str> = app.visible_metrics().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["deployment.frequency"]);

        app.filter_text = "pipeline".to_string();
        let names: Vec<&str> = app.visible_metrics().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["build.success.rate"]);
    }

    #[test]
    fn test_selection_clamped() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        app.select_last();
        assert_eq!(app.selected_index(), 5);
        app.select_next_n(10);
        assert_eq!(app.selected_index(), 5);

        app.filter_push('c');
        app.filter_push('p');
        app.filter_push('u');
        assert_eq!(app.selected_index(), 0);
        assert_eq!(app.selected_metric().as_deref(), Some("cpu.usage"));
    }

    #[test]
    fn test_selection_is_per_view() {
        let mut app = app_with(vec![Ok(sample_batch())]);
        app.reload_data();

        app.select_next();
        app.set_view(View::Sections);
        assert_eq!(app.selected_index(), 0);
        app.select_next_n(2);
        assert_eq!(app.selected_section(), Category::Infrastructure);
        app.select_last();
        assert_eq!(app.selected_section(), Category::Application);

        app.set_view(View::Summary);
        assert_eq!(app.selected_index(), 1);
    }

    #[test]
    fn test_detail_overlay() {
        let mut app = app_with(vec![Ok(sample_batch())]);

        // No data, nothing to show
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.reload_data();
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);

        app.set_view(View::Log);
        app.enter_detail();
        assert!(app.show_detail_overlay);
        assert_eq!(app.selected_metric().as_deref(), Some("cpu.usage"));

        app.go_back();
        app.go_back();
        assert_eq!(app.current_view, View::Summary);
    }

    #[test]
    fn test_refresh_and_demo_feedback() {
        let mut app = app_with(vec![]);
        app.refresh_now();
        assert_eq!(app.get_status_message(), Some("Refresh requested"));

        app.emit_demo();
        assert_eq!(app.get_status_message(), Some("Demo data needs a live collector"));
    }

    #[test]
    fn test_export_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export.json");

        let mut app = app_with(vec![Ok(sample_batch())]);
        assert!(app.export_state(&path).is_err());

        app.reload_data();
        app.export_state(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_points"], 7);
        assert_eq!(value["summary"]["cpu.usage"]["avg"], 50.28);
        assert_eq!(value["top"][0]["name"], "api.response_time");
        assert!(value["sections"]["DORA"].is_array());
    }
}
