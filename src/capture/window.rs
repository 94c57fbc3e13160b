use crate::foundation::core::Frame;

const WINDOW_LEN: usize = 2;

/// Ring buffer holding the two most recently captured frames of one in-flight variant.
///
/// Pushing a third frame evicts the oldest. A window is never shared across variants; the
/// stabilizer creates one per capture and drops it once a frame settles.
#[derive(Debug, Default)]
pub struct FrameWindow {
    slots: [Option<Frame>; WINDOW_LEN],
    // Slot the next push writes to (always the oldest once full).
    next: usize,
}

impl FrameWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of frames held.
    pub const fn capacity(&self) -> usize {
        WINDOW_LEN
    }

    /// Number of frames currently held.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Return `true` when no frame has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push a frame, returning the evicted oldest frame when the window was full.
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        let evicted = self.slots[self.next].replace(frame);
        self.next = (self.next + 1) % WINDOW_LEN;
        evicted
    }

    /// Most recently pushed frame.
    pub fn latest(&self) -> Option<&Frame> {
        self.slots[self.newest_idx()].as_ref()
    }

    /// `(older, newer)` when two frames are held.
    pub fn pair(&self) -> Option<(&Frame, &Frame)> {
        let newer = self.slots[self.newest_idx()].as_ref()?;
        let older = self.slots[self.next].as_ref()?;
        Some((older, newer))
    }

    /// Consume the window, keeping only the newest frame.
    pub fn into_latest(mut self) -> Option<Frame> {
        let idx = self.newest_idx();
        self.slots[idx].take()
    }

    fn newest_idx(&self) -> usize {
        (self.next + WINDOW_LEN - 1) % WINDOW_LEN
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/window.rs"]
mod tests;
