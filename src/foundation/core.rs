use std::fmt;
use std::time::{Duration, Instant};

use image::RgbImage;

/// A captured renderer frame plus the instant its configuration was dispatched.
///
/// Frames are moved, never shared: the stabilizer hands the settled frame to exactly one queue
/// entry.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Captured pixels (RGB8, row-major).
    pub image: RgbImage,
    /// When the configuration this frame shows was dispatched to the renderer.
    pub dispatched_at: Instant,
}

impl Frame {
    /// Wrap a captured image.
    pub fn new(image: RgbImage, dispatched_at: Instant) -> Self {
        Self {
            image,
            dispatched_at,
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Time elapsed since the frame's configuration was dispatched.
    pub fn since_dispatch(&self) -> Duration {
        self.dispatched_at.elapsed()
    }
}

/// One rendering instruction applied to a job, e.g. a rotation angle.
///
/// The tag (`<key><value>`, e.g. `angle35`) names the output artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Variant {
    /// Variant family, e.g. `angle`.
    pub key: String,
    /// Value applied to the job configuration.
    pub value: i64,
}

impl Variant {
    /// Create a variant.
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Rotation-angle variant in degrees.
    pub fn angle(degrees: i64) -> Self {
        Self::new("angle", degrees)
    }

    /// Artifact tag, e.g. `angle35`.
    pub fn tag(&self) -> String {
        format!("{}{}", self.key, self.value)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}
