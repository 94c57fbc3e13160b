use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};

use super::*;
use crate::capture::interlock::NeverPaused;
use crate::enumerate::job::{Job, VariantTask};
use crate::foundation::core::Variant;
use crate::normalize::NormalizeError;

/// Config that remembers its variant and stages it as a plain number.
struct NumberConfig {
    value: i64,
}

impl JobConfig for NumberConfig {
    fn set_variant(&mut self, variant: &Variant) -> SnapResult<()> {
        self.value = variant.value;
        Ok(())
    }

    fn save(&self, path: &Path) -> SnapResult<()> {
        std::fs::write(path, self.value.to_string())?;
        Ok(())
    }
}

/// Loader that refuses job names starting with `bad`.
struct PickyLoader;

impl JobConfigLoader for PickyLoader {
    type Config = NumberConfig;

    fn load(&self, path: &Path) -> SnapResult<NumberConfig> {
        let name = path.file_name().unwrap().to_string_lossy();
        if name.starts_with("bad") {
            return Err(SnapError::config(format!("cannot load {name}")));
        }
        Ok(NumberConfig { value: 0 })
    }
}

/// Renderer that shows a solid frame whose red channel is the staged number.
#[derive(Default)]
struct EchoRenderer {
    shown: u8,
    dispatches: usize,
}

impl RendererDriver for EchoRenderer {
    fn dispatch(&mut self, config_path: &Path) -> SnapResult<()> {
        let text = std::fs::read_to_string(config_path)?;
        self.shown = text.trim().parse::<u8>().map_err(|e| SnapError::capture(e.to_string()))?;
        self.dispatches += 1;
        Ok(())
    }

    fn capture_frame(&mut self) -> SnapResult<RgbImage> {
        Ok(RgbImage::from_pixel(4, 4, Rgb([self.shown, 1, 2])))
    }
}

fn passthrough(image: RgbImage) -> Result<DynamicImage, NormalizeError> {
    Ok(DynamicImage::ImageRgb8(image))
}

fn opts(dir: &Path) -> SessionOpts {
    SessionOpts {
        workers: 1,
        staging_path: dir.join("staging.txt"),
        stabilize: StabilizeOpts {
            min_settle: Duration::ZERO,
            ..Default::default()
        },
        queue: QueueOpts {
            capacity: 4,
            poll_interval: Duration::from_millis(5),
        },
    }
}

fn pending(dir: &Path, name: &str, variants: &[i64]) -> PendingJob {
    let job = Job::from_path(dir.join(format!("{name}.json"))).unwrap();
    let tasks = variants
        .iter()
        .map(|&v| {
            let variant = Variant::angle(v);
            VariantTask {
                artifact: job.artifact_path(&variant, "png"),
                variant,
                state: TaskState::Pending,
            }
        })
        .collect();
    PendingJob {
        job,
        tasks,
        skipped_before: 1,
    }
}

#[test]
fn zero_workers_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let o = SessionOpts {
        workers: 0,
        ..opts(dir.path())
    };
    assert!(GenerationSession::new(EchoRenderer::default(), PickyLoader, NeverPaused, o).is_err());
}

#[test]
fn failing_job_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = GenerationSession::new(
        EchoRenderer::default(),
        PickyLoader,
        NeverPaused,
        opts(dir.path()),
    )
    .unwrap();

    let jobs = vec![
        pending(dir.path(), "bad001", &[0, 35]),
        pending(dir.path(), "good001", &[0, 35]),
    ];
    let report = session.run(jobs, |_| Ok(passthrough)).unwrap();

    assert_eq!(report.jobs_failed, 1);
    assert_eq!(report.jobs_processed, 1);
    assert_eq!(report.jobs_skipped, 2);
    assert_eq!(report.variants_queued, 2);
    assert_eq!(report.pool.persisted, 2);
    assert_eq!(session.renderer().dispatches, 2);

    assert!(!dir.path().join("bad001_angle0.png").exists());
    let shot = image::open(dir.path().join("good001_angle35.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(shot.get_pixel(0, 0), &Rgb([35, 1, 2]));
}

#[test]
fn renderer_failure_mid_job_keeps_already_queued_variants() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = GenerationSession::new(
        EchoRenderer::default(),
        PickyLoader,
        NeverPaused,
        opts(dir.path()),
    )
    .unwrap();

    // 300 does not fit the renderer's u8 channel, so the second dispatch fails.
    let report = session
        .run(vec![pending(dir.path(), "face", &[7, 300])], |_| Ok(passthrough))
        .unwrap();

    assert_eq!(report.jobs_failed, 1);
    assert_eq!(report.variants_queued, 0);
    assert_eq!(report.pool.persisted, 1);
    assert!(dir.path().join("face_angle7.png").exists());
    assert!(!dir.path().join("face_angle300.png").exists());
    assert!(!dir.path().join("face_angle300.png.failed").exists());
}
