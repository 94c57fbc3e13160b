use std::path::PathBuf;
use std::time::Duration;

/// Operator pause switch consulted before every dispatch and poll.
///
/// While `is_paused` returns `true` the producer sleeps; in-flight frames are left untouched.
pub trait PauseInterlock {
    /// Return `true` while automation must hold still.
    fn is_paused(&self) -> bool;
}

impl<F> PauseInterlock for F
where
    F: Fn() -> bool,
{
    fn is_paused(&self) -> bool {
        self()
    }
}

/// Interlock that never pauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverPaused;

impl PauseInterlock for NeverPaused {
    fn is_paused(&self) -> bool {
        false
    }
}

/// Interlock that pauses while a marker file exists.
///
/// Create the file to pause a run, delete it to resume.
#[derive(Clone, Debug)]
pub struct PauseFile {
    path: PathBuf,
}

impl PauseFile {
    /// Watch `path` for presence.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PauseInterlock for PauseFile {
    fn is_paused(&self) -> bool {
        self.path.exists()
    }
}

/// Block while `interlock` reports paused, re-checking every `poll`.
///
/// Returns `true` if it had to wait.
pub fn wait_while_paused(interlock: &dyn PauseInterlock, poll: Duration) -> bool {
    if !interlock.is_paused() {
        return false;
    }
    tracing::warn!("automation paused by operator interlock; waiting for it to clear");
    while interlock.is_paused() {
        std::thread::sleep(poll);
    }
    tracing::info!("operator interlock cleared, resuming");
    true
}
