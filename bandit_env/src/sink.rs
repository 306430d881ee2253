//! Snapshot sink abstraction: the one-way boundary to rendering collaborators.

use crate::error::SinkError;
use crate::types::Snapshot;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Receives snapshots from the trial loop.
///
/// # Contract
///
/// `emit` is called from inside the trial loop and must return without
/// waiting on the consumer. A returned error is reported by the caller and
/// never stops the run.
///
/// # Implementations
///
/// - `ChannelSink` - hands snapshots to a bounded tokio channel
/// - `FnSink` - wraps a closure (tests, synchronous recorders)
pub trait SnapshotSink: Send {
    /// Hands a snapshot over to the consumer.
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError>;
}

/// Sink backed by a bounded tokio mpsc channel.
///
/// Uses `try_send`, so a slow consumer results in `SinkError::Full`
/// instead of stalling the trial loop.
pub struct ChannelSink {
    tx: mpsc::Sender<Snapshot>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the consumer should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Snapshot>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
    
    /// Wraps an existing sender.
    pub fn from_sender(tx: mpsc::Sender<Snapshot>) -> Self {
        Self { tx }
    }
}

impl SnapshotSink for ChannelSink {
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

/// Sink wrapping a closure.
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(Snapshot) -> Result<(), SinkError> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> SnapshotSink for FnSink<F>
where
    F: FnMut(Snapshot) -> Result<(), SinkError> + Send,
{
    fn emit(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        (self.f)(snapshot)
    }
}
