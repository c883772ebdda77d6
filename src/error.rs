//! Error types for collector acquisition and batch decoding.

use thiserror::Error;

/// Errors that can occur while acquiring a batch from the collector.
///
/// These never reach the user as a blocking error: the refresh coordinator
/// logs them and the dashboard keeps showing the previous snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AcquisitionError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Collector answered with a non-success status code.
    #[error("Collector returned status {0}")]
    Status(u16),

    /// Response body was not a JSON array of measurements.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Connection to the collector failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for AcquisitionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AcquisitionError::Timeout
        } else if err.is_connect() {
            AcquisitionError::Connection(err.to_string())
        } else if err.is_decode() {
            AcquisitionError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AcquisitionError::Status(status.as_u16())
        } else {
            AcquisitionError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AcquisitionError {
    fn from(err: serde_json::Error) -> Self {
        AcquisitionError::Decode(err.to_string())
    }
}

/// Reasons a single batch entry is rejected.
///
/// A rejected entry is skipped; the rest of the batch is still processed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedMeasurement {
    /// A required field is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The name is present but empty.
    #[error("empty metric name")]
    EmptyName,

    /// The value is NaN or infinite.
    #[error("non-finite value for `{0}`")]
    NonFiniteValue(String),

    /// The timestamp could not be parsed as RFC 3339.
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    /// The entry is not an object or has fields of the wrong type.
    #[error("invalid entry: {0}")]
    InvalidShape(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_error_messages() {
        assert_eq!(
            AcquisitionError::Status(503).to_string(),
            "Collector returned status 503"
        );
        assert_eq!(AcquisitionError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        assert!(matches!(AcquisitionError::from(err), AcquisitionError::Decode(_)));
    }

    #[test]
    fn test_malformed_messages() {
        assert_eq!(
            MalformedMeasurement::MissingField("when").to_string(),
            "missing field `when`"
        );
        assert_eq!(
            MalformedMeasurement::InvalidTimestamp("yesterday".into()).to_string(),
            "invalid timestamp `yesterday`"
        );
    }
}
