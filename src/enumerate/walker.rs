use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::enumerate::job::{Job, PendingJob, TaskState, VariantTask};
use crate::foundation::core::Variant;
use crate::foundation::error::{SnapError, SnapResult};

/// Traversal and resumability options for [`WorkEnumerator`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumerateOpts {
    /// Glob matched against file names, e.g. `*.json`.
    pub filter: String,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Variants every job needs, in render order.
    pub variants: Vec<Variant>,
    /// Artifact file extension (decides the persisted image format).
    pub extension: String,
    /// Files that are never jobs even when they match `filter`, e.g. the staging path the
    /// session writes each variant's configuration to.
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

impl Default for EnumerateOpts {
    fn default() -> Self {
        Self {
            filter: "*.json".to_string(),
            recursive: false,
            variants: vec![Variant::angle(0), Variant::angle(35)],
            extension: "png".to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Enumeration counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnumerateStats {
    /// Directories listed.
    pub dirs_visited: u64,
    /// Jobs emitted with at least one pending variant.
    pub jobs_emitted: u64,
    /// Jobs skipped because every variant was done.
    pub jobs_skipped: u64,
    /// Pending variants across emitted jobs.
    pub variants_pending: u64,
}

/// Lazily walks an input tree and yields jobs that still have pending variants.
///
/// Order: each directory's matching files (sorted by name) come before any of its
/// subdirectories, which are then visited depth-first in name order. A variant is done when
/// its artifact or its failure marker exists. Fully done jobs are counted, not emitted, and
/// reported in bulk with the next emitted job.
pub struct WorkEnumerator {
    opts: EnumerateOpts,
    pattern: glob::Pattern,
    dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
    skipped: u64,
    stats: EnumerateStats,
}

impl WorkEnumerator {
    /// Start enumerating at `root`.
    pub fn new(root: impl Into<PathBuf>, opts: EnumerateOpts) -> SnapResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SnapError::validation(format!(
                "input root '{}' is not a directory",
                root.display()
            )));
        }
        if opts.variants.is_empty() {
            return Err(SnapError::validation("at least one variant is required"));
        }
        if opts.extension.is_empty() {
            return Err(SnapError::validation("artifact extension must be non-empty"));
        }
        let pattern = glob::Pattern::new(&opts.filter).map_err(|e| {
            SnapError::validation(format!("invalid file filter '{}': {e}", opts.filter))
        })?;

        Ok(Self {
            opts,
            pattern,
            dirs: vec![root],
            files: VecDeque::new(),
            skipped: 0,
            stats: EnumerateStats::default(),
        })
    }

    /// Counters so far.
    pub fn stats(&self) -> EnumerateStats {
        self.stats
    }

    /// Options in use.
    pub fn opts(&self) -> &EnumerateOpts {
        &self.opts
    }

    /// Variants of `job` that are neither completed nor quarantined.
    pub fn pending_tasks(&self, job: &Job) -> Vec<VariantTask> {
        self.opts
            .variants
            .iter()
            .filter_map(|variant| {
                let artifact = job.artifact_path(variant, &self.opts.extension);
                let state = TaskState::probe(&artifact);
                (!state.is_done()).then(|| VariantTask {
                    variant: variant.clone(),
                    artifact,
                    state,
                })
            })
            .collect()
    }

    fn enter(&mut self, dir: &Path) {
        tracing::info!(dir = %dir.display(), "entering directory");
        self.stats.dirs_visited += 1;

        let mut subdirs = Vec::new();
        let listing = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in listing {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "failed to list entry");
                    continue;
                }
            };
            let ft = entry.file_type();
            if ft.is_dir() {
                if self.opts.recursive {
                    subdirs.push(entry.into_path());
                }
                continue;
            }
            let is_file = ft.is_file() || (ft.is_symlink() && entry.path().is_file());
            if is_file && self.pattern.matches(&entry.file_name().to_string_lossy()) {
                self.files.push_back(entry.into_path());
            }
        }

        // Stack: first subdirectory must be popped first.
        self.dirs.extend(subdirs.into_iter().rev());
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.opts.exclude.iter().any(|excluded| {
            excluded.file_name() == path.file_name() && same_file(excluded, path)
        })
    }

    fn flush_skipped(&mut self) {
        if self.skipped > 0 {
            tracing::info!(skipped = self.skipped, "skipped jobs with nothing left to do");
            self.skipped = 0;
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Iterator for WorkEnumerator {
    type Item = PendingJob;

    fn next(&mut self) -> Option<PendingJob> {
        loop {
            if let Some(path) = self.files.pop_front() {
                if self.is_excluded(&path) {
                    tracing::debug!(path = %path.display(), "ignoring excluded file");
                    continue;
                }
                let Some(job) = Job::from_path(path) else {
                    continue;
                };
                let tasks = self.pending_tasks(&job);
                if tasks.is_empty() {
                    self.skipped += 1;
                    self.stats.jobs_skipped += 1;
                    continue;
                }

                let skipped_before = std::mem::take(&mut self.skipped);
                tracing::info!(
                    job = %job.source.display(),
                    skipped_before,
                    pending = tasks.len(),
                    "processing job"
                );
                self.stats.jobs_emitted += 1;
                self.stats.variants_pending += tasks.len() as u64;
                return Some(PendingJob {
                    job,
                    tasks,
                    skipped_before,
                });
            }

            let Some(dir) = self.dirs.pop() else {
                self.flush_skipped();
                return None;
            };
            self.enter(&dir);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/enumerate/walker.rs"]
mod tests;
