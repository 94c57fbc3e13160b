use std::path::PathBuf;
use std::time::Duration;

use crate::foundation::core::Frame;
use crate::foundation::error::{SnapError, SnapResult};

/// A settled frame and the artifact path its normalized form is written to.
#[derive(Debug)]
pub struct QueueEntry {
    /// Captured frame; ownership moves to whichever worker dequeues it.
    pub frame: Frame,
    /// Final artifact path.
    pub destination: PathBuf,
}

impl QueueEntry {
    /// Create an entry.
    pub fn new(frame: Frame, destination: impl Into<PathBuf>) -> Self {
        Self {
            frame,
            destination: destination.into(),
        }
    }
}

/// Capacity and wait settings for [`WorkQueue`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueueOpts {
    /// Maximum number of entries held at once.
    pub capacity: usize,
    /// How long a consumer waits on an empty queue before rechecking the completion signal.
    pub poll_interval: Duration,
}

impl Default for QueueOpts {
    fn default() -> Self {
        Self {
            capacity: 200,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Bounded multi-producer multi-consumer queue of [`QueueEntry`] values.
///
/// `put` blocks while the queue is full; `get` waits at most `poll_interval` so workers can
/// periodically look at the completion signal. Clones share the same channel.
#[derive(Clone)]
pub struct WorkQueue {
    tx: flume::Sender<QueueEntry>,
    rx: flume::Receiver<QueueEntry>,
    opts: QueueOpts,
}

impl WorkQueue {
    /// Create a queue.
    pub fn new(opts: QueueOpts) -> SnapResult<Self> {
        if opts.capacity == 0 {
            return Err(SnapError::validation("queue capacity must be non-zero"));
        }
        let (tx, rx) = flume::bounded(opts.capacity);
        Ok(Self { tx, rx, opts })
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.opts.capacity
    }

    /// Entries currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Return `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Enqueue, blocking until there is room.
    pub fn put(&self, entry: QueueEntry) -> SnapResult<()> {
        self.tx
            .send(entry)
            .map_err(|_| SnapError::persist("work queue disconnected"))
    }

    /// Enqueue, waiting at most `timeout` for room. A full queue hands the entry back.
    pub fn put_timeout(&self, entry: QueueEntry, timeout: Duration) -> Result<(), QueueEntry> {
        self.tx.send_timeout(entry, timeout).map_err(|e| match e {
            flume::SendTimeoutError::Timeout(entry) => entry,
            flume::SendTimeoutError::Disconnected(entry) => entry,
        })
    }

    /// Dequeue, waiting at most the configured poll interval.
    ///
    /// `None` is the normal idle signal, not an error.
    pub fn get(&self) -> Option<QueueEntry> {
        self.get_timeout(self.opts.poll_interval)
    }

    /// Dequeue, waiting at most `timeout`.
    pub fn get_timeout(&self, timeout: Duration) -> Option<QueueEntry> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/queue.rs"]
mod tests;
