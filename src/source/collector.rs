//! HTTP client for the metrics collector.
//!
//! ## Endpoints
//!
//! - `GET /metrics`: JSON array of measurements, newest first
//! - `GET /emit_demo`: asks the collector to synthesize sample measurements
//!
//! ## Example
//!
//! ```rust,no_run
//! use devdash::{Collector, HttpCollector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = HttpCollector::builder()
//!         .base_url("http://localhost:8080")
//!         .build()?;
//!
//!     let batch = collector.fetch_metrics().await?;
//!     println!("{} measurements", batch.len());
//!     Ok(())
//! }
//! ```

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::Batch;
use crate::error::AcquisitionError;

/// Default collector location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The remote end that produces measurement batches.
#[async_trait]
pub trait Collector: Send + Sync + Debug {
    /// Fetch the current batch.
    async fn fetch_metrics(&self) -> Result<Batch, AcquisitionError>;

    /// Ask the collector to synthesize demo measurements.
    ///
    /// The new data is only observable through a later [`fetch_metrics`](Collector::fetch_metrics).
    async fn emit_demo(&self) -> Result<(), AcquisitionError>;

    /// Where the collector lives, for display.
    fn endpoint(&self) -> &str;
}

/// Collector reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCollector {
    client: Client,
    base_url: String,
}

impl HttpCollector {
    /// Create a new builder for configuring the collector client.
    pub fn builder() -> HttpCollectorBuilder {
        HttpCollectorBuilder::default()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, AcquisitionError> {
        let response = self.client.get(self.url(path)).send().await?;

        if !response.status().is_success() {
            return Err(AcquisitionError::Status(response.status().as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn fetch_metrics(&self) -> Result<Batch, AcquisitionError> {
        let body = self.get("metrics").await?.bytes().await?;
        let batch = Batch::from_json(&body)?;

        if batch.skipped() > 0 {
            warn!(
                skipped = batch.skipped(),
                "collector returned malformed measurements"
            );
        }
        debug!(count = batch.len(), "fetched metrics");
        Ok(batch)
    }

    async fn emit_demo(&self) -> Result<(), AcquisitionError> {
        self.get("emit_demo").await?;
        Ok(())
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

/// Builder for HttpCollector.
#[derive(Debug, Default)]
pub struct HttpCollectorBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpCollectorBuilder {
    /// Set the collector base URL (e.g., "http://localhost:8080").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the collector client.
    pub fn build(self) -> Result<HttpCollector, AcquisitionError> {
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpCollector { client, base_url })
    }
}
