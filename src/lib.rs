//! # devdash
//!
//! A terminal dashboard and library for DevOps metrics: DORA delivery
//! metrics, CI pipeline health, infrastructure utilization and application
//! performance.
//!
//! Measurements come from a collector service that serves the latest batch
//! over HTTP. Every refresh replaces the previous batch; the dashboard derives
//! per-metric summaries, short time series and section membership from the
//! batch alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (engine) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── CollectorSource | FileSource | ChannelSource│
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DataSource`] trait, the HTTP [`Collector`] client and
//!   the [`RefreshCoordinator`] that schedules fetches
//! - **[`data`]**: Pure derivation from a [`Batch`]: [`aggregate`](data::aggregate()),
//!   [`build_series`](data::build_series), [`classify`](data::classify())
//! - **[`app`]**: Application state, view navigation and user actions
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Layered settings (defaults, TOML file, environment)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard against the collector
//! devdash --url http://localhost:8080
//!
//! # Replay a captured response
//! devdash --file metrics.json
//!
//! # One-shot JSON export
//! devdash --export snapshot.json
//! ```
//!
//! ### As a library with the live collector
//!
//! ```no_run
//! use std::sync::Arc;
//! use devdash::{App, CollectorSource, EngineOptions, HttpCollector, RefreshSettings};
//!
//! # tokio_test::block_on(async {
//! let collector = HttpCollector::builder()
//!     .base_url("http://localhost:8080")
//!     .build()
//!     .unwrap();
//! let source = CollectorSource::spawn(Arc::new(collector), RefreshSettings::default());
//! let app = App::new(Box::new(source), EngineOptions::default());
//! # });
//! ```
//!
//! ### Deriving a snapshot directly
//!
//! ```
//! use devdash::{Batch, DashboardSnapshot, EngineOptions};
//!
//! let body = br#"[
//!     {"id": 2, "name": "cpu.usage", "value": 45.0, "when": "2024-05-01T10:00:01Z"},
//!     {"id": 1, "name": "cpu.usage", "value": 55.555, "when": "2024-05-01T10:00:00Z"}
//! ]"#;
//! let batch = Batch::from_json(body).unwrap();
//! let snapshot = DashboardSnapshot::from_batch(&batch, &EngineOptions::default());
//!
//! let stat = snapshot.summary["cpu.usage"];
//! assert_eq!((stat.avg, stat.min, stat.max, stat.count), (50.28, 45.0, 55.56, 2));
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{Category, DashboardSnapshot, EngineOptions, Series, SummaryStat, Tone};
pub use error::{AcquisitionError, MalformedMeasurement};
pub use source::{
    Batch, ChannelSource, Collector, CollectorSource, DataSource, FileSource, HttpCollector,
    Measurement, MeasurementId, RefreshCommand, RefreshCoordinator, RefreshEvent, RefreshSettings,
};
