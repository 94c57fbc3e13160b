//! Capture-stabilization: decide when the renderer's displayed output has settled.
//!
//! The [`stabilize::Stabilizer`] keeps the last two captures in a [`window::FrameWindow`],
//! compares them with [`diff::FrameDiff`], and hands back the newest frame once the global change
//! and the probe pixel both fall under their thresholds after a minimum settle time.

/// Frame difference signals.
pub mod diff;
/// Operator pause interlock.
pub mod interlock;
/// Convergence loop.
pub mod stabilize;
/// Two-frame sliding window.
pub mod window;
