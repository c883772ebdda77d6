//! Background refresh scheduling.
//!
//! A single task owns the collector and serializes every fetch:
//!
//! - one fetch immediately at startup
//! - one fetch per interval tick after that
//! - one fetch on [`RefreshCommand::RefreshNow`]
//! - one fetch a short settle delay after [`RefreshCommand::EmitDemo`]
//!
//! Results are forwarded as [`RefreshEvent`]s. A failed fetch is reported and
//! the schedule carries on; the consumer keeps whatever it displayed last.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{Batch, Collector};
use crate::error::AcquisitionError;

/// Default time between scheduled fetches.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Default wait between a demo emission and the follow-up fetch.
pub const DEFAULT_DEMO_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Timing of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    pub interval: Duration,
    pub demo_settle_delay: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            demo_settle_delay: DEFAULT_DEMO_SETTLE_DELAY,
        }
    }
}

/// Requests from the dashboard to the refresh task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    /// Fetch now, outside the schedule.
    RefreshNow,
    /// Ask the collector for demo data, then fetch after the settle delay.
    ///
    /// Only a 2xx answer schedules the follow-up fetch. Any other status is
    /// reported as [`RefreshEvent::Failed`] and the next fetch is the
    /// regular one.
    EmitDemo,
}

/// Outcome of one acquisition.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Batch(Batch),
    Failed(AcquisitionError),
}

/// Drives periodic acquisition from a [`Collector`].
#[derive(Debug)]
pub struct RefreshCoordinator {
    collector: Arc<dyn Collector>,
    settings: RefreshSettings,
}

impl RefreshCoordinator {
    pub fn new(collector: Arc<dyn Collector>, settings: RefreshSettings) -> Self {
        Self {
            collector,
            settings,
        }
    }

    /// Run until the command channel closes or the event receiver is dropped.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<RefreshCommand>,
        events: mpsc::Sender<RefreshEvent>,
    ) {
        // tokio panics on a zero period
        let period = self.settings.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut demo_deadline: Option<Instant> = None;

        info!(
            endpoint = self.collector.endpoint(),
            interval_ms = period.as_millis() as u64,
            "refresh loop started"
        );

        loop {
            let deadline = demo_deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                _ = ticker.tick() => {
                    debug!("scheduled refresh");
                }
                command = commands.recv() => match command {
                    Some(RefreshCommand::RefreshNow) => {
                        debug!("manual refresh");
                    }
                    Some(RefreshCommand::EmitDemo) => {
                        match self.collector.emit_demo().await {
                            Ok(()) => {
                                info!("demo data requested");
                                demo_deadline =
                                    Some(Instant::now() + self.settings.demo_settle_delay);
                            }
                            Err(e) => {
                                warn!(error = %e, "demo emission failed");
                                if events.send(RefreshEvent::Failed(e)).await.is_err() {
                                    break;
                                }
                            }
                        }
                        continue;
                    }
                    None => break,
                },
                _ = time::sleep_until(deadline), if demo_deadline.is_some() => {
                    demo_deadline = None;
                    debug!("post-demo refresh");
                }
            }

            if !self.refresh(&events).await {
                break;
            }
        }

        info!("refresh loop stopped");
    }

    /// Fetch once and forward the outcome. Returns `false` once nobody listens.
    async fn refresh(&self, events: &mpsc::Sender<RefreshEvent>) -> bool {
        let event = match self.collector.fetch_metrics().await {
            Ok(batch) => {
                debug!(count = batch.len(), "refresh succeeded");
                RefreshEvent::Batch(batch)
            }
            Err(e) => {
                warn!(error = %e, "refresh failed");
                RefreshEvent::Failed(e)
            }
        };
        events.send(event).await.is_ok()
    }
}
