use std::path::Path;
use std::process::{Command, Output, Stdio};

use image::RgbImage;

use crate::driver::RendererDriver;
use crate::foundation::error::{SnapError, SnapResult};

/// Placeholder replaced with the staged configuration path in the dispatch command.
pub const CONFIG_PLACEHOLDER: &str = "{config}";

/// Environment variable carrying the staged configuration path into both commands.
pub const CONFIG_ENV: &str = "SNAPFORGE_CONFIG";

/// Options for [`CommandRenderer`].
#[derive(Clone, Debug)]
pub struct CommandRendererOpts {
    /// Shell command that makes the renderer load the staged configuration.
    ///
    /// `{config}` is replaced with the staged path, which is also exported as `SNAPFORGE_CONFIG`.
    pub dispatch: String,
    /// Shell command that writes one encoded image (PNG, BMP, ...) of the renderer's output to
    /// stdout.
    pub capture: String,
}

/// [`RendererDriver`] backed by two external shell commands.
///
/// Useful for renderers that can be scripted (window automation tools, screenshot utilities,
/// headless renderers writing to stdout).
pub struct CommandRenderer {
    opts: CommandRendererOpts,
    last_config: Option<String>,
}

impl CommandRenderer {
    /// Create a renderer driver from shell commands.
    pub fn new(opts: CommandRendererOpts) -> SnapResult<Self> {
        if opts.dispatch.trim().is_empty() {
            return Err(SnapError::validation("dispatch command must be non-empty"));
        }
        if opts.capture.trim().is_empty() {
            return Err(SnapError::validation("capture command must be non-empty"));
        }
        Ok(Self {
            opts,
            last_config: None,
        })
    }

    fn run(&self, script: &str, capture_stdout: bool) -> SnapResult<Output> {
        let mut cmd = shell(script);
        if let Some(cfg) = self.last_config.as_deref() {
            cmd.env(CONFIG_ENV, cfg);
        }
        cmd.stdin(Stdio::null()).stderr(Stdio::piped()).stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let output = cmd
            .output()
            .map_err(|e| SnapError::capture(format!("failed to spawn '{script}': {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapError::capture(format!(
                "'{script}' exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output)
    }
}

impl RendererDriver for CommandRenderer {
    fn dispatch(&mut self, config_path: &Path) -> SnapResult<()> {
        let cfg = config_path.to_string_lossy().into_owned();
        let script = self.opts.dispatch.replace(CONFIG_PLACEHOLDER, &cfg);
        self.last_config = Some(cfg);
        self.run(&script, false)?;
        Ok(())
    }

    fn capture_frame(&mut self) -> SnapResult<RgbImage> {
        let output = self.run(&self.opts.capture, true)?;
        if output.stdout.is_empty() {
            return Err(SnapError::capture("capture command produced no image data"));
        }
        let img = image::load_from_memory(&output.stdout)
            .map_err(|e| SnapError::capture(format!("failed to decode captured image: {e}")))?;
        Ok(img.to_rgb8())
    }
}

#[cfg(unix)]
fn shell(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[cfg(windows)]
fn shell(script: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(script);
    cmd
}
