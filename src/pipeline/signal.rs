use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Write-once "no more work is coming" flag shared by the producer and every worker.
///
/// Once completed it never resets. Workers still drain whatever is already queued.
#[derive(Clone, Debug, Default)]
pub struct CompletionSignal {
    done: Arc<AtomicBool>,
}

impl CompletionSignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce that production has finished. Idempotent.
    pub fn complete(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Return `true` once [`CompletionSignal::complete`] has been called on any clone.
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}
