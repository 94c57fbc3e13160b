use image::{DynamicImage, RgbImage, imageops};

use crate::foundation::error::{SnapError, SnapResult};
use crate::normalize::{NormalizeError, Normalizer};

/// Default output edge length in pixels.
pub const DEFAULT_SIZE: u32 = 500;

/// Crops the largest centered square out of a frame and resizes it to `size x size`.
///
/// Featureless (single-color) frames are rejected with [`NormalizeError::NoSubject`]; they mean
/// the renderer showed nothing worth keeping.
#[derive(Clone, Debug)]
pub struct SquareNormalizer {
    size: u32,
}

impl SquareNormalizer {
    /// Create a normalizer producing `size x size` artifacts.
    pub fn new(size: u32) -> SnapResult<Self> {
        if size == 0 {
            return Err(SnapError::validation("normalize size must be non-zero"));
        }
        Ok(Self { size })
    }

    /// Output edge length.
    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Default for SquareNormalizer {
    fn default() -> Self {
        Self { size: DEFAULT_SIZE }
    }
}

impl Normalizer for SquareNormalizer {
    fn normalize(&mut self, image: RgbImage) -> Result<DynamicImage, NormalizeError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(NormalizeError::EmptyFrame);
        }
        if is_uniform(&image) {
            return Err(NormalizeError::NoSubject);
        }

        let edge = w.min(h);
        let x = (w - edge) / 2;
        let y = (h - edge) / 2;
        let cropped = imageops::crop_imm(&image, x, y, edge, edge).to_image();
        let out = if edge == self.size {
            cropped
        } else {
            imageops::resize(
                &cropped,
                self.size,
                self.size,
                imageops::FilterType::Lanczos3,
            )
        };
        Ok(DynamicImage::ImageRgb8(out))
    }
}

fn is_uniform(image: &RgbImage) -> bool {
    let mut px = image.pixels();
    let Some(first) = px.next() else {
        return true;
    };
    px.all(|p| p == first)
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/square.rs"]
mod tests;
