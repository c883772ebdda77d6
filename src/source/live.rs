//! Live data source backed by a background refresh task.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Batch, Collector, DataSource, RefreshCommand, RefreshCoordinator, RefreshEvent, RefreshSettings};

const COMMAND_BUFFER: usize = 8;
const EVENT_BUFFER: usize = 16;

/// A data source that pulls from a [`Collector`] on a schedule.
///
/// The refresh loop runs as a tokio task; [`poll`](DataSource::poll) only
/// drains what it has delivered, so the UI thread never waits on the network.
/// When a fetch fails the error is exposed through [`error`](DataSource::error)
/// and no batch is returned, leaving the previous one on screen.
#[derive(Debug)]
pub struct CollectorSource {
    commands: mpsc::Sender<RefreshCommand>,
    events: mpsc::Receiver<RefreshEvent>,
    description: String,
    last_error: Option<String>,
    task: JoinHandle<()>,
}

impl CollectorSource {
    /// Start the refresh loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(collector: Arc<dyn Collector>, settings: RefreshSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (evt_tx, evt_rx) = mpsc::channel(EVENT_BUFFER);
        let description = format!("collector: {}", collector.endpoint());

        let coordinator = RefreshCoordinator::new(collector, settings);
        let task = tokio::spawn(coordinator.run(cmd_rx, evt_tx));

        Self {
            commands: cmd_tx,
            events: evt_rx,
            description,
            last_error: None,
            task,
        }
    }

    fn send(&self, command: RefreshCommand) -> bool {
        match self.commands.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                debug!(?command, error = %e, "refresh command dropped");
                false
            }
        }
    }
}

impl DataSource for CollectorSource {
    fn poll(&mut self) -> Option<Batch> {
        let mut latest = None;

        loop {
            match self.events.try_recv() {
                Ok(RefreshEvent::Batch(batch)) => {
                    self.last_error = None;
                    latest = Some(batch);
                }
                Ok(RefreshEvent::Failed(e)) => {
                    self.last_error = Some(e.to_string());
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.last_error = Some("Refresh task stopped".to_string());
                    break;
                }
            }
        }

        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn refresh_now(&mut self) {
        self.send(RefreshCommand::RefreshNow);
    }

    fn emit_demo(&mut self) -> bool {
        self.send(RefreshCommand::EmitDemo)
    }
}

impl Drop for CollectorSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionError;
    use crate::source::refresh::tests::{one, ScriptedCollector};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    /// Let the refresh task run until it is idle again.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_returns_first_batch() {
        let collector = Arc::new(ScriptedCollector::new(vec![Ok(one("cpu.usage", 1.0))]));
        let mut source = CollectorSource::spawn(collector, RefreshSettings::default());
        assert_eq!(source.description(), "collector: scripted");

        settle().await;
        let batch = source.poll().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(source.error().is_none());
        assert!(source.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_error_then_clears() {
        let collector = Arc::new(ScriptedCollector::new(vec![
            Err(AcquisitionError::Timeout),
            Ok(one("cpu.usage", 1.0)),
        ]));
        let mut source = CollectorSource::spawn(collector, RefreshSettings::default());

        settle().await;
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Request timed out"));

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        settle().await;
        assert!(source.poll().is_some());
        assert!(source.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_reach_collector() {
        let collector = Arc::new(ScriptedCollector::new(vec![]));
        let mut source = CollectorSource::spawn(collector.clone(), RefreshSettings::default());
        settle().await;
        source.poll();

        source.refresh_now();
        settle().await;
        assert_eq!(collector.fetches.load(Ordering::SeqCst), 2);

        assert!(source.emit_demo());
        settle().await;
        assert_eq!(collector.demos.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(collector.fetches.load(Ordering::SeqCst), 3);
    }
}
