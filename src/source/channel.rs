//! Channel-based data source.
//!
//! Receives batches via a tokio watch channel, for embedders that acquire
//! measurements themselves and only want the dashboard.

use tokio::sync::watch;

use super::{Batch, DataSource};

/// A data source fed through a watch channel.
///
/// Only batches sent after the source was created are returned; the
/// channel's initial empty value is never shown.
///
/// # Example
///
/// ```
/// use devdash::{Batch, ChannelSource, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("embedded");
/// tx.send(Batch::default()).unwrap();
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Batch>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// `source_description` names the producer for the header (e.g. "replay").
    pub fn new(receiver: watch::Receiver<Batch>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair for pushing batches to a ChannelSource.
    pub fn create(source_description: &str) -> (watch::Sender<Batch>, Self) {
        let (tx, rx) = watch::channel(Batch::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Batch> {
        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            Ok(false) => None,
            Err(_) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.closed.then_some("Producer disconnected")
    }
}
