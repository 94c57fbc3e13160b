use image::RgbImage;

/// Pixel location sampled in the difference image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProbePoint {
    /// Column, 0-based from the left edge.
    pub x: u32,
    /// Row, 0-based from the top edge.
    pub y: u32,
}

impl ProbePoint {
    /// Create a probe point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Change signals between two consecutive frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameDiff {
    /// Sum of squared per-channel differences over the whole image (`S`).
    pub sum_sq: u64,
    /// Channel sum of the difference image at the probe point (`P`); 0 when no probe applies.
    pub probe: u32,
}

impl FrameDiff {
    /// Compare two frames.
    ///
    /// Returns `None` when dimensions differ; such a pair cannot be compared and never counts as
    /// settled. A probe outside the frame contributes 0.
    pub fn between(a: &RgbImage, b: &RgbImage, probe: Option<ProbePoint>) -> Option<Self> {
        if a.dimensions() != b.dimensions() {
            return None;
        }

        let sum_sq = a
            .as_raw()
            .iter()
            .zip(b.as_raw().iter())
            .map(|(&x, &y)| {
                let d = u64::from(x.abs_diff(y));
                d * d
            })
            .sum();

        let probe = probe
            .filter(|p| p.x < a.width() && p.y < a.height())
            .map(|p| {
                let pa = a.get_pixel(p.x, p.y);
                let pb = b.get_pixel(p.x, p.y);
                (0..3)
                    .map(|i| u32::from(pa[i].abs_diff(pb[i])))
                    .sum::<u32>()
            })
            .unwrap_or(0);

        Some(Self { sum_sq, probe })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/diff.rs"]
mod tests;
