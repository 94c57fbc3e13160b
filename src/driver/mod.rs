//! Collaborator seams the capture core drives: the renderer and the job configuration.
//!
//! The core only depends on the traits here. [`command::CommandRenderer`] and
//! [`job_config::JsonJobLoader`] are the implementations the CLI wires up.

use std::path::Path;

use image::RgbImage;

use crate::foundation::core::Variant;
use crate::foundation::error::SnapResult;

/// Renderer driven by external commands.
pub mod command;
/// JSON job configuration loader.
pub mod job_config;

/// An opaque renderer that can be told what to show and polled for what it shows.
///
/// Both calls are synchronous with renderer-defined latency.
pub trait RendererDriver {
    /// Ask the renderer to display the configuration staged at `config_path`.
    fn dispatch(&mut self, config_path: &Path) -> SnapResult<()>;

    /// Capture what the renderer currently displays.
    fn capture_frame(&mut self) -> SnapResult<RgbImage>;
}

impl<R: RendererDriver + ?Sized> RendererDriver for &mut R {
    fn dispatch(&mut self, config_path: &Path) -> SnapResult<()> {
        (**self).dispatch(config_path)
    }

    fn capture_frame(&mut self) -> SnapResult<RgbImage> {
        (**self).capture_frame()
    }
}

/// A loaded job configuration that can be specialized per variant and staged for the renderer.
pub trait JobConfig {
    /// Apply a variant (e.g. set the rotation angle).
    fn set_variant(&mut self, variant: &Variant) -> SnapResult<()>;

    /// Write the configuration where the renderer will pick it up.
    fn save(&self, path: &Path) -> SnapResult<()>;
}

/// Loads job configurations discovered by the enumerator.
pub trait JobConfigLoader {
    /// Loaded configuration type.
    type Config: JobConfig;

    /// Load the job configuration stored at `path`.
    fn load(&self, path: &Path) -> SnapResult<Self::Config>;
}
