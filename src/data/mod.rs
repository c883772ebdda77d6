//! The metrics engine: pure transformations from a batch to display state.
//!
//! Nothing in this module performs I/O or keeps state between calls; the same
//! batch always yields the same summary, series and classification.
//!
//! ## Submodules
//!
//! - [`aggregate`]: Per-name summary statistics ([`SummaryStat`])
//! - [`classify`]: Substring rules mapping names to dashboard [`Category`] sections
//! - [`series`]: Window-bounded chronological series for charts and sparklines
//! - [`snapshot`]: [`DashboardSnapshot`], the derived state for one refresh
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Batch (decoded collector response, newest first)
//!        │
//!        ▼
//! DashboardSnapshot::from_batch()
//!        │
//!        ├──▶ aggregate()     -> summary per name
//!        ├──▶ build_series()  -> first W entries, reversed, grouped
//!        └──▶ classify()      -> section membership per name
//! ```

pub mod aggregate;
pub mod classify;
pub mod duration;
pub mod series;
pub mod snapshot;

pub use aggregate::{aggregate, round2, top_by_average, SummaryStat};
pub use classify::{classify, icon, primary_category, tone, Category, Tone};
pub use series::{build_series, Series, SeriesPoint, DEFAULT_WINDOW};
pub use snapshot::{DashboardSnapshot, EngineOptions, DEFAULT_RAW_LOG_LIMIT};
