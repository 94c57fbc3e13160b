//! Normalizer seam: turns a settled capture into the artifact that gets persisted.
//!
//! Normalizers are not assumed to be reentrant. Every worker owns its own instance, hence the
//! `&mut self` receiver.

use image::{DynamicImage, RgbImage};

/// Center-crop + resize normalizer.
pub mod square;

/// Why a frame could not be normalized. Any of these quarantines the variant.
#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    /// The frame has no pixels.
    #[error("frame is empty")]
    EmptyFrame,

    /// Nothing to normalize was found in the frame.
    #[error("no subject found in frame")]
    NoSubject,

    /// The frame is malformed or otherwise unprocessable.
    #[error("unprocessable frame: {0}")]
    Unprocessable(String),
}

/// Converts a captured frame into a normalized artifact.
pub trait Normalizer {
    /// Normalize one frame.
    fn normalize(&mut self, image: RgbImage) -> Result<DynamicImage, NormalizeError>;
}

impl<F> Normalizer for F
where
    F: FnMut(RgbImage) -> Result<DynamicImage, NormalizeError>,
{
    fn normalize(&mut self, image: RgbImage) -> Result<DynamicImage, NormalizeError> {
        self(image)
    }
}
