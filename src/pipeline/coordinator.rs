use std::marker::PhantomData;
use std::thread::{Builder, Scope, ScopedJoinHandle};

use crate::foundation::error::{SnapError, SnapResult};
use crate::normalize::Normalizer;
use crate::pipeline::queue::{QueueEntry, WorkQueue};
use crate::pipeline::signal::CompletionSignal;
use crate::pipeline::worker::{Worker, WorkerReport};

/// Aggregated worker counters collected at the join barrier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of workers that ran (1 for inline mode).
    pub workers: usize,
    /// Artifacts written.
    pub persisted: u64,
    /// Entries quarantined.
    pub quarantined: u64,
    /// Per-worker breakdown.
    pub reports: Vec<WorkerReport>,
}

impl PoolStats {
    fn from_reports(reports: Vec<WorkerReport>) -> Self {
        Self {
            workers: reports.len(),
            persisted: reports.iter().map(|r| r.persisted).sum(),
            quarantined: reports.iter().map(|r| r.quarantined).sum(),
            reports,
        }
    }
}

/// Scoped worker threads draining a shared [`WorkQueue`], each owning an `N` normalizer.
pub struct WorkerPool<'scope, N> {
    handles: Vec<ScopedJoinHandle<'scope, WorkerReport>>,
    _normalizer: PhantomData<fn() -> N>,
}

impl<'scope, N> WorkerPool<'scope, N> {
    /// Spawn `workers` threads, each with a normalizer built by `make_normalizer(worker_index)`.
    ///
    /// Normalizers are built on the calling thread before their worker starts. If one fails to
    /// build, the completion signal is set so already started workers exit, and the error is
    /// returned.
    pub fn spawn<'env, F>(
        scope: &'scope Scope<'scope, 'env>,
        workers: usize,
        queue: &WorkQueue,
        signal: &CompletionSignal,
        mut make_normalizer: F,
    ) -> SnapResult<Self>
    where
        N: Normalizer + Send + 'scope,
        F: FnMut(usize) -> SnapResult<N>,
    {
        if workers == 0 {
            return Err(SnapError::validation("worker count must be non-zero"));
        }

        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let spawned = make_normalizer(id).and_then(|normalizer| {
                let worker = Worker::new(id, queue.clone(), signal.clone(), normalizer);
                Builder::new()
                    .name(format!("snapforge-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run())
                    .map_err(|e| SnapError::validation(format!("spawn worker {id}: {e}")))
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    signal.complete();
                    return Err(e);
                }
            }
        }
        Ok(Self {
            handles,
            _normalizer: PhantomData,
        })
    }

    /// Number of worker threads.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Return `true` when the pool has no workers.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    pub fn join(self) -> SnapResult<Vec<WorkerReport>> {
        let mut reports = Vec::with_capacity(self.handles.len());
        let mut panicked = 0usize;
        for handle in self.handles {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => panicked += 1,
            }
        }
        if panicked > 0 {
            return Err(SnapError::Other(anyhow::anyhow!(
                "{panicked} normalization worker(s) panicked"
            )));
        }
        Ok(reports)
    }
}

enum Consumers<'scope, N> {
    Pool(WorkerPool<'scope, N>),
    Inline(Worker<N>),
}

/// Producer-side handle that feeds the queue and sequences shutdown.
///
/// [`CompletionCoordinator::finish`] consumes the coordinator, so nothing can be submitted once
/// shutdown begins. With a single worker there are no threads: the completion signal is set up
/// front and the worker drains inline after every submission.
pub struct CompletionCoordinator<'scope, N> {
    queue: WorkQueue,
    signal: CompletionSignal,
    consumers: Consumers<'scope, N>,
}

impl<'scope, N: Normalizer> CompletionCoordinator<'scope, N> {
    /// Coordinate a threaded pool.
    pub fn pooled(
        queue: WorkQueue,
        signal: CompletionSignal,
        pool: WorkerPool<'scope, N>,
    ) -> Self {
        Self {
            queue,
            signal,
            consumers: Consumers::Pool(pool),
        }
    }

    /// Coordinate a single inline worker.
    pub fn inline(queue: WorkQueue, signal: CompletionSignal, normalizer: N) -> Self {
        signal.complete();
        let worker = Worker::new(0, queue.clone(), signal.clone(), normalizer);
        Self {
            queue,
            signal,
            consumers: Consumers::Inline(worker),
        }
    }

    /// Hand a captured frame to the consumers, blocking while the queue is full.
    pub fn submit(&mut self, entry: QueueEntry) -> SnapResult<()> {
        tracing::debug!(
            path = %entry.destination.display(),
            queued = self.queue.len(),
            "queueing frame"
        );
        self.queue.put(entry)?;
        if let Consumers::Inline(worker) = &mut self.consumers {
            worker.drain();
        }
        Ok(())
    }

    /// Set the completion signal and wait until every worker has drained and exited.
    pub fn finish(self) -> SnapResult<PoolStats> {
        self.signal.complete();
        let reports = match self.consumers {
            Consumers::Pool(pool) => pool.join()?,
            Consumers::Inline(mut worker) => {
                worker.drain();
                vec![worker.report()]
            }
        };
        Ok(PoolStats::from_reports(reports))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/coordinator.rs"]
mod tests;
