use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::enumerate::job::failure_marker_path;
use crate::foundation::error::{SnapError, SnapResult};
use crate::normalize::{NormalizeError, Normalizer};
use crate::pipeline::queue::{QueueEntry, WorkQueue};
use crate::pipeline::signal::CompletionSignal;

/// What happened to one dequeued entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The normalized artifact was written to its destination.
    Persisted(PathBuf),
    /// Normalization or persistence failed; the variant is marked as permanently failed.
    Quarantined {
        /// Artifact path that was not written.
        destination: PathBuf,
        /// Failure marker path (absent if even the marker could not be written).
        marker: Option<PathBuf>,
        /// Rendered error.
        reason: String,
    },
}

/// Per-worker counters, returned through the join barrier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index.
    pub worker: usize,
    /// Artifacts written.
    pub persisted: u64,
    /// Entries quarantined.
    pub quarantined: u64,
}

/// One queue consumer owning its own normalizer.
///
/// Shares nothing with other workers except the queue and the completion signal.
pub struct Worker<N> {
    id: usize,
    queue: WorkQueue,
    signal: CompletionSignal,
    normalizer: N,
    report: WorkerReport,
}

impl<N: Normalizer> Worker<N> {
    /// Create a worker.
    pub fn new(id: usize, queue: WorkQueue, signal: CompletionSignal, normalizer: N) -> Self {
        Self {
            id,
            queue,
            signal,
            normalizer,
            report: WorkerReport {
                worker: id,
                ..Default::default()
            },
        }
    }

    /// Counters so far.
    pub fn report(&self) -> WorkerReport {
        self.report
    }

    /// Drain until the completion signal is set and the queue is empty, then report.
    pub fn run(mut self) -> WorkerReport {
        tracing::info!(worker = self.id, "worker started");
        self.drain();
        tracing::info!(
            worker = self.id,
            persisted = self.report.persisted,
            quarantined = self.report.quarantined,
            "worker done"
        );
        self.report
    }

    /// Process entries until one check observes the completion signal set and the queue empty.
    ///
    /// With the signal already set this returns as soon as the queue is drained, which is how
    /// single-worker runs process inline after every enqueue.
    pub fn drain(&mut self) {
        loop {
            if self.signal.is_complete() && self.queue.is_empty() {
                return;
            }
            if let Some(entry) = self.queue.get() {
                self.process(entry);
            }
        }
    }

    /// Normalize and persist one entry, quarantining it on any failure.
    pub fn process(&mut self, entry: QueueEntry) -> Outcome {
        let QueueEntry { frame, destination } = entry;
        let result = self
            .normalize_guarded(frame.image)
            .map_err(SnapError::from)
            .and_then(|img| persist_artifact(&img, &destination));

        match result {
            Ok(()) => {
                self.report.persisted += 1;
                tracing::info!(worker = self.id, path = %destination.display(), "generated");
                Outcome::Persisted(destination)
            }
            Err(err) => {
                self.report.quarantined += 1;
                let reason = err.to_string();
                tracing::warn!(
                    worker = self.id,
                    path = %destination.display(),
                    error = %reason,
                    "failed to generate"
                );
                let marker = match write_failure_marker(&destination) {
                    Ok(marker) => Some(marker),
                    Err(e) => {
                        tracing::error!(
                            worker = self.id,
                            path = %destination.display(),
                            error = %e,
                            "failed to write failure marker"
                        );
                        None
                    }
                };
                Outcome::Quarantined {
                    destination,
                    marker,
                    reason,
                }
            }
        }
    }

    fn normalize_guarded(
        &mut self,
        image: image::RgbImage,
    ) -> Result<DynamicImage, NormalizeError> {
        let normalizer = &mut self.normalizer;
        catch_unwind(AssertUnwindSafe(|| normalizer.normalize(image)))
            .unwrap_or_else(|_| Err(NormalizeError::Unprocessable("normalizer panicked".into())))
    }
}

/// Write `image` to `destination` without ever exposing a partial file there.
///
/// The image goes to a hidden sibling first and is renamed into place; the format follows the
/// destination extension.
pub fn persist_artifact(image: &DynamicImage, destination: &Path) -> SnapResult<()> {
    let format = ImageFormat::from_path(destination).map_err(|e| {
        SnapError::persist(format!(
            "unsupported artifact format '{}': {e}",
            destination.display()
        ))
    })?;
    let file_name = destination
        .file_name()
        .ok_or_else(|| SnapError::persist("artifact path has no file name"))?;
    let tmp = destination.with_file_name(format!(".{}.partial", file_name.to_string_lossy()));

    let written = image
        .save_with_format(&tmp, format)
        .map_err(|e| SnapError::persist(format!("write '{}': {e}", tmp.display())))
        .and_then(|()| {
            std::fs::rename(&tmp, destination).map_err(|e| {
                SnapError::persist(format!("move into '{}': {e}", destination.display()))
            })
        });
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

/// Create the zero-byte failure marker for `destination` and return its path.
pub fn write_failure_marker(destination: &Path) -> SnapResult<PathBuf> {
    let marker = failure_marker_path(destination);
    std::fs::File::create(&marker).map_err(|e| {
        SnapError::persist(format!("create marker '{}': {e}", marker.display()))
    })?;
    Ok(marker)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/worker.rs"]
mod tests;
