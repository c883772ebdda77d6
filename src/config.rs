//! Layered dashboard settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `DEVDASH_*` environment variables (e.g. `DEVDASH_BASE_URL`)
//!
//! Command line flags are applied on top by the binary.
//!
//! ```toml
//! base_url = "http://localhost:8080"
//! refresh_interval = "5s"
//! demo_settle_delay = "500ms"
//! request_timeout = "10s"
//! series_window = 50
//! raw_log_limit = 100
//! log_file = "devdash.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{EngineOptions, DEFAULT_RAW_LOG_LIMIT, DEFAULT_WINDOW};
use crate::source::{RefreshSettings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DEVDASH";

/// Default log destination for interactive runs.
pub const DEFAULT_LOG_FILE: &str = "devdash.log";

/// Resolved settings. Durations stay as strings until [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    pub base_url: String,
    pub refresh_interval: String,
    pub demo_settle_delay: String,
    pub request_timeout: String,
    pub series_window: usize,
    pub raw_log_limit: usize,
    pub log_file: PathBuf,
}

/// Settings with durations parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub refresh: RefreshSettings,
    pub request_timeout: Duration,
    pub engine: EngineOptions,
    pub log_file: PathBuf,
}

impl DashboardConfig {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("refresh_interval", "5000ms")?
            .set_default("demo_settle_delay", "500ms")?
            .set_default("request_timeout", format!("{}s", DEFAULT_TIMEOUT.as_secs()))?
            .set_default("series_window", DEFAULT_WINDOW as i64)?
            .set_default("raw_log_limit", DEFAULT_RAW_LOG_LIMIT as i64)?
            .set_default("log_file", DEFAULT_LOG_FILE)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Parse durations and check ranges.
    pub fn validate(&self) -> Result<ResolvedConfig> {
        let interval = parse_duration(&self.refresh_interval)
            .with_context(|| format!("refresh_interval: {}", self.refresh_interval))?;
        if interval.is_zero() {
            bail!("refresh_interval must be greater than zero");
        }

        let demo_settle_delay = parse_duration(&self.demo_settle_delay)
            .with_context(|| format!("demo_settle_delay: {}", self.demo_settle_delay))?;
        let request_timeout = parse_duration(&self.request_timeout)
            .with_context(|| format!("request_timeout: {}", self.request_timeout))?;
        if request_timeout.is_zero() {
            bail!("request_timeout must be greater than zero");
        }

        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }

        Ok(ResolvedConfig {
            base_url: self.base_url.trim().to_string(),
            refresh: RefreshSettings {
                interval,
                demo_settle_delay,
            },
            request_timeout,
            engine: EngineOptions {
                series_window: self.series_window,
                raw_log_limit: self.raw_log_limit,
            },
            log_file: self.log_file.clone(),
        })
    }
}
