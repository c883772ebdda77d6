//! Data source abstraction for receiving measurement batches.
//!
//! The dashboard polls a [`DataSource`] on every tick of its event loop. The
//! live source is backed by a background refresh task talking to the
//! collector over HTTP; the file and channel sources serve captured batches
//! and embedders that push batches themselves.

mod batch;
mod channel;
mod collector;
mod file;
mod live;
pub(crate) mod refresh;

pub use batch::{Batch, Measurement, MeasurementId};
pub use channel::ChannelSource;
pub use collector::{Collector, HttpCollector, HttpCollectorBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use file::FileSource;
pub use live::CollectorSource;
pub use refresh::{
    RefreshCommand, RefreshCoordinator, RefreshEvent, RefreshSettings, DEFAULT_DEMO_SETTLE_DELAY,
    DEFAULT_REFRESH_INTERVAL,
};

use std::fmt::Debug;

/// Trait for receiving measurement batches from various sources.
///
/// # Example
///
/// ```
/// use devdash::{DataSource, FileSource};
///
/// let mut source = FileSource::new("metrics.json");
/// if let Some(batch) = source.poll() {
///     println!("Got {} measurements", batch.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest batch.
    ///
    /// Returns `Some(batch)` if a new batch is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<Batch>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// Returns the last acquisition error, cleared by the next good batch.
    fn error(&self) -> Option<&str>;

    /// Ask for a refresh outside the regular schedule.
    fn refresh_now(&mut self) {}

    /// Ask the collector to synthesize demo measurements.
    ///
    /// Returns `false` if the source has no collector behind it.
    fn emit_demo(&mut self) -> bool {
        false
    }
}
