use std::path::Path;
use std::time::{Duration, Instant};

use crate::capture::diff::{FrameDiff, ProbePoint};
use crate::capture::interlock::{PauseInterlock, wait_while_paused};
use crate::capture::window::FrameWindow;
use crate::driver::RendererDriver;
use crate::foundation::core::Frame;
use crate::foundation::error::{SnapError, SnapResult};

/// Convergence thresholds for [`Stabilizer`].
///
/// A frame pair is settled when `sum_sq < sum_sq_threshold`, `probe < probe_threshold` and at
/// least `min_settle` has passed since dispatch. All three must hold on the same poll.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StabilizeOpts {
    /// Upper bound (exclusive) on the sum of squared channel differences.
    pub sum_sq_threshold: u64,
    /// Difference-image pixel whose channel sum must drop below `probe_threshold`.
    ///
    /// `None` disables the probe condition. The right location depends on the renderer's UI
    /// layout and resolution, e.g. `ProbePoint::new(574, 582)` for a busy indicator that
    /// flips a few pixels while the global difference is already small.
    pub probe: Option<ProbePoint>,
    /// Upper bound (exclusive) on the probe pixel's channel sum.
    pub probe_threshold: u32,
    /// Minimum time between dispatch and an accepted frame.
    pub min_settle: Duration,
    /// Give up after this long. `None` polls until the renderer settles.
    pub timeout: Option<Duration>,
    /// Sleep between interlock checks while paused.
    pub pause_poll: Duration,
}

impl Default for StabilizeOpts {
    fn default() -> Self {
        Self {
            sum_sq_threshold: 850_000_000,
            probe: None,
            probe_threshold: 50,
            min_settle: Duration::from_millis(300),
            timeout: None,
            pause_poll: Duration::from_secs(1),
        }
    }
}

impl StabilizeOpts {
    /// Decide whether a compared frame pair counts as settled.
    ///
    /// `diff` is `None` when the pair could not be compared (dimension change).
    pub fn is_settled(&self, diff: Option<FrameDiff>, since_dispatch: Duration) -> bool {
        let Some(diff) = diff else {
            return false;
        };
        diff.sum_sq < self.sum_sq_threshold
            && diff.probe < self.probe_threshold
            && since_dispatch >= self.min_settle
    }
}

/// Drives a renderer until its output stops changing and returns the settled frame.
pub struct Stabilizer<'a> {
    opts: StabilizeOpts,
    interlock: &'a dyn PauseInterlock,
}

impl<'a> Stabilizer<'a> {
    /// Create a stabilizer gated by `interlock`.
    pub fn new(opts: StabilizeOpts, interlock: &'a dyn PauseInterlock) -> Self {
        Self { opts, interlock }
    }

    /// Active thresholds.
    pub fn opts(&self) -> &StabilizeOpts {
        &self.opts
    }

    /// Dispatch the configuration at `config_path` and poll until two consecutive captures agree.
    ///
    /// There is no sleep between polls beyond capture latency. Without a configured timeout this
    /// blocks for as long as the renderer keeps changing.
    pub fn capture_settled<R>(&self, renderer: &mut R, config_path: &Path) -> SnapResult<Frame>
    where
        R: RendererDriver + ?Sized,
    {
        self.hold_if_paused();
        let dispatched_at = Instant::now();
        renderer.dispatch(config_path)?;

        let mut window = FrameWindow::new();
        self.hold_if_paused();
        window.push(Frame::new(renderer.capture_frame()?, dispatched_at));

        let mut polls = 0u64;
        loop {
            self.hold_if_paused();
            window.push(Frame::new(renderer.capture_frame()?, dispatched_at));
            polls += 1;

            let (older, newer) = window
                .pair()
                .ok_or_else(|| SnapError::capture("frame window lost a frame"))?;
            let diff = FrameDiff::between(&older.image, &newer.image, self.opts.probe);
            let elapsed = dispatched_at.elapsed();
            if self.opts.is_settled(diff, elapsed) {
                tracing::debug!(polls, elapsed_ms = elapsed.as_millis() as u64, "frame settled");
                break;
            }
            if let Some(timeout) = self.opts.timeout
                && elapsed >= timeout
            {
                return Err(SnapError::capture(format!(
                    "renderer did not settle within {timeout:?} ({polls} polls)"
                )));
            }
        }

        window
            .into_latest()
            .ok_or_else(|| SnapError::capture("frame window empty after settling"))
    }

    fn hold_if_paused(&self) {
        wait_while_paused(self.interlock, self.opts.pause_poll);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/stabilize.rs"]
mod tests;
