use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::foundation::core::Variant;

/// Suffix appended to an artifact path to mark the variant as permanently failed.
pub const FAILURE_MARKER_SUFFIX: &str = ".failed";

/// One discovered input configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    /// Path of the input configuration file.
    pub source: PathBuf,
    /// File name without its final extension; prefixes every artifact name.
    pub base_name: String,
}

impl Job {
    /// Describe the job stored at `source`. Returns `None` for paths without a file name.
    pub fn from_path(source: impl Into<PathBuf>) -> Option<Self> {
        let source = source.into();
        let base_name = source.file_stem()?.to_string_lossy().into_owned();
        Some(Self { source, base_name })
    }

    /// Directory holding the input, and therefore its artifacts.
    pub fn dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Output artifact path for `variant`: `<dir>/<base>_<tag>.<extension>`.
    pub fn artifact_path(&self, variant: &Variant, extension: &str) -> PathBuf {
        self.dir()
            .join(format!("{}_{}.{}", self.base_name, variant.tag(), extension))
    }
}

/// Sentinel path recording a permanent failure for `artifact`.
pub fn failure_marker_path(artifact: &Path) -> PathBuf {
    let mut s: OsString = artifact.as_os_str().to_owned();
    s.push(FAILURE_MARKER_SUFFIX);
    PathBuf::from(s)
}

/// Lifecycle of one (job, variant) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Needs a capture.
    Pending,
    /// Captured and handed to the normalization queue.
    Queued,
    /// The artifact exists.
    Completed,
    /// A failure marker exists; never retried.
    PermanentlyFailed,
}

impl TaskState {
    /// Derive the resumable state of `artifact` from disk.
    pub fn probe(artifact: &Path) -> Self {
        if artifact.exists() {
            Self::Completed
        } else if failure_marker_path(artifact).exists() {
            Self::PermanentlyFailed
        } else {
            Self::Pending
        }
    }

    /// `true` for states that need no further work.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::PermanentlyFailed)
    }
}

/// A (job, variant) pair that still needs an artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantTask {
    /// Variant to render.
    pub variant: Variant,
    /// Where the normalized artifact goes.
    pub artifact: PathBuf,
    /// Current lifecycle state.
    pub state: TaskState,
}

impl VariantTask {
    /// Failure marker path for this task.
    pub fn failure_marker(&self) -> PathBuf {
        failure_marker_path(&self.artifact)
    }
}

/// A job together with the variants that still need work.
#[derive(Clone, Debug)]
pub struct PendingJob {
    /// The discovered job.
    pub job: Job,
    /// Pending variants, in configured order. Never empty.
    pub tasks: Vec<VariantTask>,
    /// Jobs skipped as fully done since the previous emitted job.
    pub skipped_before: u64,
}
