//! Wire types for collector batches.
//!
//! These types match the JSON served by the collector's `GET /metrics`
//! endpoint: an array of `{ id, name, value, when }` objects, newest first.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::MalformedMeasurement;

/// Opaque measurement identifier.
///
/// The collector emits integer ids; string ids are accepted as well. Only
/// used as a display key, never for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementId::Number(n) => write!(f, "{}", n),
            MeasurementId::Text(s) => f.write_str(s),
        }
    }
}

/// One named numeric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    /// Dot-segmented metric name, e.g. `api.response_time`.
    pub name: String,
    pub value: f64,
    pub when: DateTime<Utc>,
}

impl Measurement {
    /// Build a measurement. Used by tests and embedders pushing batches directly.
    pub fn new(id: i64, name: impl Into<String>, value: f64, when: DateTime<Utc>) -> Self {
        Self {
            id: MeasurementId::Number(id),
            name: name.into(),
            value,
            when,
        }
    }

    /// Validate one entry of a collector response.
    ///
    /// `index` is used as a fallback id when the entry carries none.
    pub fn from_value(value: Value, index: usize) -> Result<Self, MalformedMeasurement> {
        let raw: RawMeasurement = serde_json::from_value(value)
            .map_err(|e| MalformedMeasurement::InvalidShape(e.to_string()))?;

        let name = raw.name.ok_or(MalformedMeasurement::MissingField("name"))?;
        if name.is_empty() {
            return Err(MalformedMeasurement::EmptyName);
        }

        let value = raw.value.ok_or(MalformedMeasurement::MissingField("value"))?;
        if !value.is_finite() {
            return Err(MalformedMeasurement::NonFiniteValue(name));
        }

        let when = raw.when.ok_or(MalformedMeasurement::MissingField("when"))?;
        let when = DateTime::parse_from_rfc3339(&when)
            .map_err(|_| MalformedMeasurement::InvalidTimestamp(when.clone()))?
            .with_timezone(&Utc);

        Ok(Self {
            id: raw.id.unwrap_or(MeasurementId::Text(format!("#{}", index))),
            name,
            value,
            when,
        })
    }
}

/// Permissive shape used before validation.
#[derive(Debug, Deserialize)]
struct RawMeasurement {
    #[serde(default)]
    id: Option<MeasurementId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    when: Option<String>,
}

/// The finite ordered set of measurements returned by one acquisition.
///
/// Order is preserved exactly as received (newest first from the collector).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    measurements: Vec<Measurement>,
    skipped: usize,
}

impl Batch {
    /// Wrap already-validated measurements.
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self {
            measurements,
            skipped: 0,
        }
    }

    /// Decode a collector response body.
    ///
    /// A `null` body (the collector's empty list) is an empty batch. Entries
    /// that fail validation are skipped and counted; only a body that is not
    /// a JSON array at all is an error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: Option<Vec<Value>> = serde_json::from_slice(bytes)?;
        Ok(Self::from_values(entries.unwrap_or_default()))
    }

    /// Validate a list of raw JSON entries, skipping malformed ones.
    pub fn from_values(entries: Vec<Value>) -> Self {
        let mut measurements = Vec::with_capacity(entries.len());
        let mut skipped = 0;

        for (index, entry) in entries.into_iter().enumerate() {
            match Measurement::from_value(entry, index) {
                Ok(m) => measurements.push(m),
                Err(e) => {
                    debug!(index, error = %e, "skipping malformed measurement");
                    skipped += 1;
                }
            }
        }

        Self {
            measurements,
            skipped,
        }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Number of entries dropped during decoding.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl From<Vec<Measurement>> for Batch {
    fn from(measurements: Vec<Measurement>) -> Self {
        Self::new(measurements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_batch() {
        let json = r#"[
            {"id": 2, "name": "cpu.usage", "value": 45.0, "when": "2024-05-01T10:00:01.250Z"},
            {"id": 1, "name": "cpu.usage", "value": 55.555, "when": "2024-05-01T10:00:00Z"}
        ]"#;

        let batch = Batch::from_json(json.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped(), 0);

        let first = &batch.measurements()[0];
        assert_eq!(first.id, MeasurementId::Number(2));
        assert_eq!(first.name, "cpu.usage");
        assert_eq!(first.value, 45.0);
        assert_eq!(first.when.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_null_body_is_empty_batch() {
        let batch = Batch::from_json(b"null").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.skipped(), 0);
    }

    #[test]
    fn test_non_array_body_is_error() {
        assert!(Batch::from_json(br#"{"status":"ok"}"#).is_err());
        assert!(Batch::from_json(b"<html>").is_err());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let json = r#"[
            {"id": 1, "name": "cpu.usage", "value": 10.0, "when": "2024-05-01T10:00:00Z"},
            {"id": 2, "value": 10.0, "when": "2024-05-01T10:00:00Z"},
            {"id": 3, "name": "", "value": 10.0, "when": "2024-05-01T10:00:00Z"},
            {"id": 4, "name": "cpu.usage", "when": "2024-05-01T10:00:00Z"},
            {"id": 5, "name": "cpu.usage", "value": "high", "when": "2024-05-01T10:00:00Z"},
            {"id": 6, "name": "cpu.usage", "value": 1.0, "when": "yesterday"},
            {"id": 7, "name": "cpu.usage", "value": 1.0},
            42,
            {"id": 9, "name": "memory.usage", "value": 20.5, "when": "2024-05-01T09:59:00+02:00"}
        ]"#;

        let batch = Batch::from_json(json.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped(), 7);
        assert_eq!(batch.measurements()[1].name, "memory.usage");
        assert_eq!(
            batch.measurements()[1].when,
            DateTime::parse_from_rfc3339("2024-05-01T07:59:00Z").unwrap()
        );
    }

    #[test]
    fn test_validation_reasons() {
        let missing_when = serde_json::json!({"id": 1, "name": "a", "value": 1.0});
        assert_eq!(
            Measurement::from_value(missing_when, 0),
            Err(MalformedMeasurement::MissingField("when"))
        );

        let empty_name = serde_json::json!({"name": "", "value": 1.0, "when": "2024-05-01T10:00:00Z"});
        assert_eq!(
            Measurement::from_value(empty_name, 0),
            Err(MalformedMeasurement::EmptyName)
        );
    }

    #[test]
    fn test_missing_id_falls_back_to_index() {
        let entry = serde_json::json!({"name": "db.query_time", "value": 12.0, "when": "2024-05-01T10:00:00Z"});
        let m = Measurement::from_value(entry, 7).unwrap();
        assert_eq!(m.id, MeasurementId::Text("#7".to_string()));
        assert_eq!(m.id.to_string(), "#7");
    }

    #[test]
    fn test_string_ids_accepted() {
        let entry = serde_json::json!({"id": "abc", "name": "a", "value": 1.0, "when": "2024-05-01T10:00:00Z"});
        let m = Measurement::from_value(entry, 0).unwrap();
        assert_eq!(m.id, MeasurementId::Text("abc".to_string()));
    }
}
