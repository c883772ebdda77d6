//! Bounded per-name time series for charting.
//!
//! The window is applied to the batch as a whole *before* grouping: only the
//! first `window` entries (the most recent, since the collector sends newest
//! first) are charted. A low-volume metric can therefore be crowded out of
//! the charts entirely when busier metrics fill the front of the batch.
//!
//! After reversal the entries are sorted by timestamp, stably. For a
//! newest-first batch this changes nothing. When the collector's clocks are
//! skewed it does reorder a metric's points relative to batch order: every
//! series is non-decreasing in time at the cost of no longer mirroring the
//! reversed batch.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::aggregate::round2;
use crate::source::Measurement;

/// Default number of batch entries considered for charting.
pub const DEFAULT_WINDOW: usize = 50;

/// Sparkline characters (8 levels of height).
const SPARKLINE_LEVELS: usize = 8;

/// One charted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Local wall-clock label, `HH:MM:SS`.
    pub time: String,
    /// Originating timestamp, kept for ordering and chart axes.
    pub when: DateTime<Utc>,
    /// Value rounded to two decimals.
    pub value: f64,
}

impl SeriesPoint {
    fn from_measurement(m: &Measurement) -> Self {
        Self {
            time: m.when.with_timezone(&Local).format("%H:%M:%S").to_string(),
            when: m.when,
            value: round2(m.value),
        }
    }
}

/// Chronologically ordered points for one metric name, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent value in the series.
    pub fn latest(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }

    /// `(min, max)` of the charted values.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.value;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        }))
    }

    /// Values normalized to 0-7 for 8 bar levels.
    ///
    /// Returns an empty Vec if there are fewer than 2 points.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        let Some((min, max)) = self.bounds() else {
            return Vec::new();
        };

        let range = max - min;
        let top = (SPARKLINE_LEVELS - 1) as f64;
        self.points
            .iter()
            .map(|p| {
                if range <= f64::EPSILON {
                    return 0;
                }
                let normalized = ((p.value - min) / range * top) as u8;
                normalized.min(top as u8)
            })
            .collect()
    }
}

/// Build per-name series from the first `window` entries of `batch`.
///
/// Entries are reversed into chronological order before grouping. Names that
/// only occur past the window get no series.
pub fn build_series(batch: &[Measurement], window: usize) -> BTreeMap<String, Series> {
    let mut recent: Vec<&Measurement> = batch.iter().take(window).collect();
    recent.reverse();
    // Stable, so a newest-first batch keeps its reversed order exactly
    recent.sort_by_key(|m| m.when);

    let mut series: BTreeMap<String, Series> = BTreeMap::new();
    for m in recent {
        series
            .entry(m.name.clone())
            .or_default()
            .points
            .push(SeriesPoint::from_measurement(m));
    }
    series
}
