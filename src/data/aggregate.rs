//! Per-name summary statistics over a batch.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::source::Measurement;

/// Summary of all values sharing one metric name in a batch.
///
/// `avg`, `min` and `max` are rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStat {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Running accumulator for one name.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

impl Accumulator {
    fn new(value: f64) -> Self {
        Self {
            sum: value,
            min: value,
            max: value,
            count: 1,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    fn finish(self) -> SummaryStat {
        // Float drift in the sum must not push the mean outside [min, max]
        let mean = (self.sum / self.count as f64).clamp(self.min, self.max);
        SummaryStat {
            avg: round2(mean),
            min: round2(self.min),
            max: round2(self.max),
            count: self.count,
        }
    }
}

/// Round to two decimal places, halves away from zero.
///
/// Values too large to scale are already whole and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Reduce a batch to one [`SummaryStat`] per distinct name.
///
/// An empty batch yields an empty map.
pub fn aggregate(batch: &[Measurement]) -> BTreeMap<String, SummaryStat> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for m in batch {
        groups
            .entry(m.name.as_str())
            .and_modify(|acc| acc.push(m.value))
            .or_insert_with(|| Accumulator::new(m.value));
    }

    groups
        .into_iter()
        .map(|(name, acc)| (name.to_string(), acc.finish()))
        .collect()
}

/// The `n` names with the highest average, descending; ties break by name.
pub fn top_by_average(summary: &BTreeMap<String, SummaryStat>, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(&String, &SummaryStat)> = summary.iter().collect();
    ranked.sort_by(|a, b| b.1.avg.total_cmp(&a.1.avg).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(name, stat)| (name.clone(), stat.avg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn m(id: i64, name: &str, value: f64) -> Measurement {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Measurement::new(id, name, value, t0 + Duration::seconds(id))
    }

    /// Deterministic pseudo-random batch for property checks.
    fn pseudo_random_batch(seed: u64, len: usize) -> Vec<Measurement> {
        let names = ["cpu.usage", "error.rate", "build.duration", "api.response_time"];
        let mut state = seed;
        (0..len)
            .map(|i| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let name = names[(state >> 33) as usize % names.len()];
                let value = ((state >> 11) % 100_000) as f64 / 37.0 - 500.0;
                m(i as i64, name, value)
            })
            .collect()
    }

    #[test]
    fn test_empty_batch() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_cpu_usage_scenario() {
        let batch = vec![m(1, "cpu.usage", 55.555), m(2, "cpu.usage", 45.0)];
        let summary = aggregate(&batch);

        assert_eq!(summary.len(), 1);
        let stat = summary["cpu.usage"];
        assert_eq!(stat.avg, 50.28);
        assert_eq!(stat.min, 45.0);
        assert_eq!(stat.max, 55.56);
        assert_eq!(stat.count, 2);
    }

    #[test]
    fn test_single_measurement_group() {
        let summary = aggregate(&[m(1, "mttr.minutes", 12.345)]);
        let stat = summary["mttr.minutes"];
        assert_eq!(stat.min, stat.max);
        assert_eq!(stat.avg, stat.min);
        assert_eq!(stat.count, 1);
    }

    #[test]
    fn test_groups_by_name() {
        let batch = vec![
            m(1, "a", 1.0),
            m(2, "b", 10.0),
            m(3, "a", 3.0),
            m(4, "b", 20.0),
            m(5, "a", 5.0),
        ];
        let summary = aggregate(&batch);
        assert_eq!(summary["a"], SummaryStat { avg: 3.0, min: 1.0, max: 5.0, count: 3 });
        assert_eq!(summary["b"], SummaryStat { avg: 15.0, min: 10.0, max: 20.0, count: 2 });
    }

    #[test]
    fn test_negative_values() {
        let summary = aggregate(&[m(1, "delta", -1.004), m(2, "delta", -3.0)]);
        let stat = summary["delta"];
        assert_eq!(stat.max, -1.0);
        assert_eq!(stat.min, -3.0);
    }

    #[test]
    fn test_mean_stays_within_bounds_for_identical_values() {
        let batch: Vec<_> = (0..3).map(|i| m(i, "x", 0.1)).collect();
        let stat = aggregate(&batch)["x"];
        assert_eq!(stat.avg, 0.1);
        assert!(stat.min <= stat.avg && stat.avg <= stat.max);
    }

    #[test]
    fn test_ordering_and_counts_hold_for_generated_batches() {
        for seed in 1..40 {
            let batch = pseudo_random_batch(seed, (seed as usize * 7) % 120 + 1);
            let summary = aggregate(&batch);

            for (name, stat) in &summary {
                assert!(stat.min <= stat.avg, "seed {} name {}", seed, name);
                assert!(stat.avg <= stat.max, "seed {} name {}", seed, name);
                let expected = batch.iter().filter(|x| &x.name == name).count();
                assert_eq!(stat.count, expected);
            }
            let total: usize = summary.values().map(|s| s.count).sum();
            assert_eq!(total, batch.len());
        }
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let batch = pseudo_random_batch(7, 80);
        assert_eq!(aggregate(&batch), aggregate(&batch));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(55.555), 55.56);
        assert_eq!(round2(45.0), 45.0);
        assert_eq!(round2(-2.346), -2.35);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(1.7e308), 1.7e308);
        assert_eq!(round2(-1.7e308), -1.7e308);
    }

    #[test]
    fn test_huge_values_stay_finite() {
        let batch = vec![m(1, "disk.bytes", 1e307), m(2, "disk.bytes", 1.7e308)];
        let stat = aggregate(&batch)["disk.bytes"];
        assert!(stat.avg.is_finite() && stat.min.is_finite() && stat.max.is_finite());
        assert_eq!(stat.min, 1e307);
        assert_eq!(stat.max, 1.7e308);
        assert!(stat.min <= stat.avg && stat.avg <= stat.max);
        assert_eq!(stat.count, 2);
    }

    #[test]
    fn test_top_by_average() {
        let batch = vec![
            m(1, "low", 1.0),
            m(2, "high", 100.0),
            m(3, "mid", 50.0),
            m(4, "also.mid", 50.0),
        ];
        let summary = aggregate(&batch);

        let top = top_by_average(&summary, 3);
        assert_eq!(
            top,
            vec![
                ("high".to_string(), 100.0),
                ("also.mid".to_string(), 50.0),
                ("mid".to_string(), 50.0),
            ]
        );
        assert_eq!(top_by_average(&summary, 10).len(), 4);
        assert!(top_by_average(&BTreeMap::new(), 5).is_empty());
    }
}
