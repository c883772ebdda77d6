//! Human duration strings for settings: `"5s"`, `"500ms"`, `"1.5m"`.

use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
];

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Parse a duration such as `"5s"`, `"500ms"` or `"2m"`.
///
/// A bare number is read as milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Empty duration");
    }

    let (number, nanos_per_unit) = UNITS
        .iter()
        .find_map(|(suffix, factor)| s.strip_suffix(suffix).map(|n| (n, *factor)))
        .unwrap_or((s, NANOS_PER_MILLI));

    let value: f64 = number
        .trim()
        .parse()
        .with_context(|| format!("Unknown duration format: {}", s))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Duration must be a non-negative number: {}", s);
    }

    Ok(Duration::from_nanos((value * nanos_per_unit).round() as u64))
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis == 0 {
        "0ms".to_string()
    } else if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m{:02}s", millis / 60_000, (millis % 60_000) / 1_000)
    }
}
