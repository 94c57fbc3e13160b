#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Snapforge drives an external renderer through a set of job variants, waits for each displayed
//! frame to settle, and normalizes the captures into image artifacts on a bounded worker pool.
//!
//! Runs are resumable: an artifact or a `.failed` marker next to a job means that variant is done.

pub mod capture;
pub mod driver;
pub mod enumerate;
mod foundation;
pub mod normalize;
pub mod pipeline;

pub use capture::diff::{FrameDiff, ProbePoint};
pub use capture::interlock::{NeverPaused, PauseFile, PauseInterlock, wait_while_paused};
pub use capture::stabilize::{StabilizeOpts, Stabilizer};
pub use capture::window::FrameWindow;
pub use driver::command::{CommandRenderer, CommandRendererOpts};
pub use driver::job_config::{JsonJobConfig, JsonJobLoader};
pub use driver::{JobConfig, JobConfigLoader, RendererDriver};
pub use enumerate::job::{
    FAILURE_MARKER_SUFFIX, Job, PendingJob, TaskState, VariantTask, failure_marker_path,
};
pub use enumerate::walker::{EnumerateOpts, EnumerateStats, WorkEnumerator};
pub use foundation::core::{Frame, Variant};
pub use foundation::error::{SnapError, SnapResult};
pub use normalize::square::SquareNormalizer;
pub use normalize::{NormalizeError, Normalizer};
pub use pipeline::coordinator::{CompletionCoordinator, PoolStats, WorkerPool};
pub use pipeline::queue::{QueueEntry, QueueOpts, WorkQueue};
pub use pipeline::session::{GenerationSession, RunReport, SessionOpts};
pub use pipeline::signal::CompletionSignal;
pub use pipeline::worker::{Outcome, Worker, WorkerReport, persist_artifact, write_failure_marker};
