//! The derived dashboard state for one batch.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::aggregate::{aggregate, top_by_average, SummaryStat};
use super::classify::{classify, Category};
use super::series::{build_series, Series, DEFAULT_WINDOW};
use crate::source::{Batch, Measurement};

/// Default number of raw measurements kept for the log view.
pub const DEFAULT_RAW_LOG_LIMIT: usize = 100;

/// Number of entries in the top-by-average ranking.
pub const TOP_N: usize = 5;

/// Limits applied when deriving a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Batch entries considered for charting.
    pub series_window: usize,
    /// Batch entries kept for the raw log.
    pub raw_log_limit: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            series_window: DEFAULT_WINDOW,
            raw_log_limit: DEFAULT_RAW_LOG_LIMIT,
        }
    }
}

/// Immutable view of one refresh cycle, ready for display.
///
/// A new snapshot is derived for every batch and replaces the previous one
/// wholesale; nothing carries over between cycles.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub summary: BTreeMap<String, SummaryStat>,
    pub series: BTreeMap<String, Series>,
    /// Names per section, sorted. Uncategorized names appear in no section.
    pub sections: BTreeMap<Category, Vec<String>>,
    /// Highest averages, descending.
    pub top: Vec<(String, f64)>,
    /// Head of the batch for the raw log, newest first.
    #[serde(skip)]
    pub recent: Vec<Measurement>,
    pub total_points: usize,
    /// Entries dropped while decoding the batch.
    pub skipped: usize,
    pub fetched_at: DateTime<Utc>,
    #[serde(skip)]
    pub last_updated: Instant,
}

impl DashboardSnapshot {
    /// Derive a snapshot from a batch.
    pub fn from_batch(batch: &Batch, options: &EngineOptions) -> Self {
        let measurements = batch.measurements();
        let summary = aggregate(measurements);
        let series = build_series(measurements, options.series_window);

        let mut sections: BTreeMap<Category, Vec<String>> =
            Category::SECTIONS.iter().map(|c| (*c, Vec::new())).collect();
        for name in summary.keys() {
            for category in classify(name) {
                sections.entry(category).or_default().push(name.clone());
            }
        }

        let top = top_by_average(&summary, TOP_N);

        Self {
            summary,
            series,
            sections,
            top,
            recent: measurements.iter().take(options.raw_log_limit).cloned().collect(),
            total_points: measurements.len(),
            skipped: batch.skipped(),
            fetched_at: Utc::now(),
            last_updated: Instant::now(),
        }
    }

    /// Names in a section, empty for [`Category::Uncategorized`].
    pub fn section(&self, category: Category) -> &[String] {
        self.sections.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names that belong to no section.
    pub fn uncategorized(&self) -> Vec<&str> {
        self.summary
            .keys()
            .filter(|name| classify(name).is_empty())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    /// JSON document written by the export action.
    pub fn export(&self) -> Result<Value> {
        let sections: Map<String, Value> = Category::SECTIONS
            .iter()
            .map(|c| (c.label().to_string(), json!(self.section(*c))))
            .collect();
        let top: Vec<Value> = self
            .top
            .iter()
            .map(|(name, avg)| json!({ "name": name, "avg": avg }))
            .collect();

        Ok(json!({
            "fetched_at": self.fetched_at.to_rfc3339(),
            "total_points": self.total_points,
            "skipped": self.skipped,
            "summary": serde_json::to_value(&self.summary)?,
            "sections": sections,
            "uncategorized": self.uncategorized(),
            "top": top,
        }))
    }

    /// Write [`export`](Self::export) as pretty JSON.
    pub fn export_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.export()?)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn batch(names: &[&str]) -> Batch {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Measurement::new(i as i64, *name, i as f64, t0 - Duration::seconds(i as i64)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_empty_batch_gives_empty_snapshot() {
        let snapshot = DashboardSnapshot::from_batch(&Batch::default(), &EngineOptions::default());
        assert!(snapshot.is_empty());
        assert!(snapshot.series.is_empty());
        assert!(snapshot.recent.is_empty());
        assert!(snapshot.top.is_empty());
        for category in Category::SECTIONS {
            assert!(snapshot.section(category).is_empty());
        }
    }

    #[test]
    fn test_sections_partition_by_classifier() {
        let snapshot = DashboardSnapshot::from_batch(
            &batch(&[
                "deployment.frequency",
                "build.failure.count",
                "cpu.usage",
                "api.response_time",
                "unrelated.metric",
            ]),
            &EngineOptions::default(),
        );

        assert_eq!(
            snapshot.section(Category::Delivery),
            ["build.failure.count", "deployment.frequency"]
        );
        assert_eq!(snapshot.section(Category::Pipeline), ["build.failure.count"]);
        assert_eq!(snapshot.section(Category::Infrastructure), ["cpu.usage"]);
        assert_eq!(snapshot.section(Category::Application), ["api.response_time"]);
        assert!(snapshot.section(Category::Uncategorized).is_empty());
        assert_eq!(snapshot.uncategorized(), vec!["unrelated.metric"]);
        // Still listed in the raw log
        assert!(snapshot.recent.iter().any(|m| m.name == "unrelated.metric"));
    }

    #[test]
    fn test_raw_log_limit() {
        let names: Vec<&str> = std::iter::repeat("cpu.usage").take(150).collect();
        let snapshot = DashboardSnapshot::from_batch(&batch(&names), &EngineOptions::default());
        assert_eq!(snapshot.recent.len(), DEFAULT_RAW_LOG_LIMIT);
        assert_eq!(snapshot.total_points, 150);
        assert_eq!(snapshot.recent[0].id.to_string(), "0");
    }

    #[test]
    fn test_custom_window() {
        let names: Vec<&str> = std::iter::repeat("cpu.usage").take(30).collect();
        let options = EngineOptions {
            series_window: 5,
            raw_log_limit: 10,
        };
        let snapshot = DashboardSnapshot::from_batch(&batch(&names), &options);
        assert_eq!(snapshot.series["cpu.usage"].len(), 5);
        assert_eq!(snapshot.recent.len(), 10);
        assert_eq!(snapshot.summary["cpu.usage"].count, 30);
    }

    #[test]
    fn test_skipped_count_carried_over() {
        let json = br#"[{"id":1,"name":"cpu.usage","value":1.0,"when":"2024-05-01T10:00:00Z"},{"id":2}]"#;
        let batch = Batch::from_json(json).unwrap();
        let snapshot = DashboardSnapshot::from_batch(&batch, &EngineOptions::default());
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.total_points, 1);
    }

    #[test]
    fn test_export_document() {
        let snapshot = DashboardSnapshot::from_batch(
            &batch(&["cpu.usage", "deployment.frequency", "unrelated.metric"]),
            &EngineOptions::default(),
        );
        let value = snapshot.export().unwrap();

        assert_eq!(value["total_points"], 3);
        assert_eq!(value["sections"]["DORA"][0], "deployment.frequency");
        assert_eq!(value["sections"]["Infrastructure"][0], "cpu.usage");
        assert_eq!(value["uncategorized"][0], "unrelated.metric");
        assert_eq!(value["top"][0]["name"], "unrelated.metric");
        assert_eq!(value["top"][0]["avg"], 2.0);
        assert!(value.get("series").is_none());
    }

    #[test]
    fn test_export_shape() {
        let snapshot =
            DashboardSnapshot::from_batch(&batch(&["cpu.usage", "error.rate"]), &EngineOptions::default());
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value["summary"]["cpu.usage"]["avg"].is_number());
        assert!(value["sections"]["Infrastructure"].is_array());
        assert!(value.get("recent").is_none());
        assert_eq!(value["total_points"], 2);
    }
}
