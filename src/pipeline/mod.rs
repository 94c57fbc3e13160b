//! Bounded normalization pipeline.
//!
//! The producer ([`session::GenerationSession`]) captures settled frames and submits them through
//! a [`coordinator::CompletionCoordinator`] into a bounded [`queue::WorkQueue`]. Workers drain the
//! queue, normalize each frame and persist it, or leave a failure marker. Shutdown is a
//! [`signal::CompletionSignal`] followed by a join barrier, so nothing queued is ever dropped.

/// Producer-side shutdown sequencing and the worker pool.
pub mod coordinator;
/// Bounded MPMC queue of captured frames.
pub mod queue;
/// Job-by-job generation loop.
pub mod session;
/// Shared "no more work" flag.
pub mod signal;
/// Queue consumer with persistence and quarantine.
pub mod worker;
