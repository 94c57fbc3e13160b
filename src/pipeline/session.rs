use std::path::PathBuf;

use crate::capture::interlock::{PauseInterlock, wait_while_paused};
use crate::capture::stabilize::{StabilizeOpts, Stabilizer};
use crate::driver::{JobConfig, JobConfigLoader, RendererDriver};
use crate::enumerate::job::{PendingJob, TaskState};
use crate::foundation::error::{SnapError, SnapResult};
use crate::normalize::Normalizer;
use crate::pipeline::coordinator::{CompletionCoordinator, PoolStats, WorkerPool};
use crate::pipeline::queue::{QueueEntry, QueueOpts, WorkQueue};
use crate::pipeline::signal::CompletionSignal;

/// Options for a [`GenerationSession`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionOpts {
    /// Normalization workers. `1` runs normalization inline on the producer thread.
    pub workers: usize,
    /// Where each variant's configuration is staged for the renderer.
    pub staging_path: PathBuf,
    /// Stabilization thresholds.
    pub stabilize: StabilizeOpts,
    /// Queue capacity and consumer poll interval.
    pub queue: QueueOpts,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            workers: 1,
            staging_path: PathBuf::from("test.json"),
            stabilize: StabilizeOpts::default(),
            queue: QueueOpts::default(),
        }
    }
}

/// Summary of one generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Jobs whose pending variants were all captured and queued.
    pub jobs_processed: u64,
    /// Jobs abandoned after an error.
    pub jobs_failed: u64,
    /// Jobs skipped by the enumerator because nothing was left to do.
    pub jobs_skipped: u64,
    /// Frames handed to the normalization queue.
    pub variants_queued: u64,
    /// Worker-side results.
    pub pool: PoolStats,
}

/// Producer that drives the renderer job by job and feeds settled frames to the workers.
pub struct GenerationSession<R, L, P> {
    renderer: R,
    loader: L,
    interlock: P,
    opts: SessionOpts,
}

impl<R, L, P> GenerationSession<R, L, P>
where
    R: RendererDriver,
    L: JobConfigLoader,
    P: PauseInterlock,
{
    /// Create a session.
    pub fn new(renderer: R, loader: L, interlock: P, opts: SessionOpts) -> SnapResult<Self> {
        if opts.workers == 0 {
            return Err(SnapError::validation("worker count must be non-zero"));
        }
        if opts.staging_path.as_os_str().is_empty() {
            return Err(SnapError::validation("staging path must be non-empty"));
        }
        Ok(Self {
            renderer,
            loader,
            interlock,
            opts,
        })
    }

    /// Options in use.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Borrow the renderer driver.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Process every job, then wait for normalization to drain.
    ///
    /// A failing job is logged and abandoned; the run carries on with the next one. Frames that
    /// were already queued are always normalized (or quarantined) before this returns.
    pub fn run<N, F, I>(&mut self, jobs: I, mut make_normalizer: F) -> SnapResult<RunReport>
    where
        N: Normalizer + Send,
        F: FnMut(usize) -> SnapResult<N>,
        I: IntoIterator<Item = PendingJob>,
    {
        let queue = WorkQueue::new(self.opts.queue.clone())?;
        let signal = CompletionSignal::new();
        let workers = self.opts.workers;

        std::thread::scope(|scope| -> SnapResult<RunReport> {
            tracing::info!(workers, capacity = queue.capacity(), "starting normalization");
            let mut coordinator = if workers > 1 {
                let pool =
                    WorkerPool::spawn(scope, workers, &queue, &signal, &mut make_normalizer)?;
                CompletionCoordinator::pooled(queue.clone(), signal.clone(), pool)
            } else {
                CompletionCoordinator::inline(queue.clone(), signal.clone(), make_normalizer(0)?)
            };

            let mut report = RunReport::default();
            for pending in jobs {
                report.jobs_skipped += pending.skipped_before;
                match self.process_job(&pending, &mut coordinator) {
                    Ok(queued) => {
                        report.jobs_processed += 1;
                        report.variants_queued += queued;
                    }
                    Err(e) => {
                        report.jobs_failed += 1;
                        tracing::warn!(
                            job = %pending.job.source.display(),
                            error = %e,
                            "failed to process job"
                        );
                    }
                }
            }

            tracing::info!(
                processed = report.jobs_processed,
                failed = report.jobs_failed,
                queued = report.variants_queued,
                "generator done, waiting for workers"
            );
            report.pool = coordinator.finish()?;
            tracing::info!(
                persisted = report.pool.persisted,
                quarantined = report.pool.quarantined,
                "normalization finished"
            );
            Ok(report)
        })
    }

    /// Capture every pending variant of one job and queue the settled frames.
    ///
    /// Returns the number of frames queued. The first error abandons the job's remaining
    /// variants; frames already queued still get processed.
    #[tracing::instrument(skip_all, fields(job = %pending.job.base_name))]
    pub fn process_job<N: Normalizer>(
        &mut self,
        pending: &PendingJob,
        coordinator: &mut CompletionCoordinator<'_, N>,
    ) -> SnapResult<u64> {
        wait_while_paused(&self.interlock, self.opts.stabilize.pause_poll);

        let mut config = self.loader.load(&pending.job.source)?;
        let stabilizer = Stabilizer::new(self.opts.stabilize.clone(), &self.interlock);
        let mut queued = 0u64;
        for task in &pending.tasks {
            config.set_variant(&task.variant)?;
            config.save(&self.opts.staging_path)?;
            let frame =
                stabilizer.capture_settled(&mut self.renderer, &self.opts.staging_path)?;
            coordinator.submit(QueueEntry::new(frame, task.artifact.clone()))?;
            queued += 1;
            tracing::debug!(
                variant = %task.variant,
                state = ?TaskState::Queued,
                path = %task.artifact.display(),
                "variant captured"
            );
        }
        Ok(queued)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/session.rs"]
mod tests;
