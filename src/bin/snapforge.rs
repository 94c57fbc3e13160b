use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use snapforge::{
    CommandRenderer, CommandRendererOpts, EnumerateOpts, EnumerateStats, GenerationSession,
    JsonJobLoader, NeverPaused, PauseFile, PauseInterlock, ProbePoint, QueueOpts, RunReport,
    SessionOpts, SquareNormalizer, StabilizeOpts, Variant, WorkEnumerator,
};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[derive(Parser, Debug)]
#[command(name = "snapforge", version)]
struct Cli {
    /// Root directory holding job configurations.
    #[arg(long)]
    input: PathBuf,

    /// Glob matched against job file names.
    #[arg(long, default_value = "*.json")]
    filter: String,

    /// Descend into subdirectories.
    #[arg(long)]
    recursive: bool,

    /// Normalization workers (1 normalizes inline).
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Edge length of the square artifacts.
    #[arg(long, default_value_t = snapforge::normalize::square::DEFAULT_SIZE)]
    normalize_size: u32,

    /// Where each variant's configuration is written before dispatch.
    #[arg(long, default_value = "test.json")]
    staging_path: PathBuf,

    /// Top-level JSON field receiving the variant angle.
    #[arg(long, default_value = "rotation")]
    variant_field: String,

    /// Angles to render for every job.
    #[arg(long, value_delimiter = ',', default_values_t = [0i64, 35])]
    angles: Vec<i64>,

    /// Shell command that loads the staged config into the renderer (`{config}` is substituted).
    #[arg(long)]
    dispatch_cmd: String,

    /// Shell command that prints one encoded image of the renderer output to stdout.
    #[arg(long)]
    capture_cmd: String,

    /// Pause capturing while this file exists.
    #[arg(long)]
    pause_file: Option<PathBuf>,

    /// Sum-of-squared-differences threshold below which two frames count as settled.
    #[arg(long, default_value_t = 850_000_000)]
    threshold: u64,

    /// Probe pixel as `X,Y`.
    #[arg(long, value_parser = parse_probe)]
    probe: Option<ProbePoint>,

    /// Maximum per-channel change summed at the probe pixel.
    #[arg(long, default_value_t = 50)]
    probe_threshold: u32,

    /// Minimum time between dispatch and an accepted capture.
    #[arg(long, default_value_t = 300)]
    min_settle_ms: u64,

    /// Give up on a variant after this many milliseconds without settling.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Bounded queue capacity between capture and normalization.
    #[arg(long, default_value_t = 200)]
    queue_capacity: usize,

    /// Log filter (overrides `RUST_LOG`).
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_probe(s: &str) -> Result<ProbePoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("probe x: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("probe y: {e}"))?;
    Ok(ProbePoint::new(x, y))
}

fn init_tracing(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => tracing_subscriber::EnvFilter::try_new(level)
            .with_context(|| format!("parse log level '{level}'"))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

fn run<P: PauseInterlock>(
    renderer: CommandRenderer,
    loader: JsonJobLoader,
    interlock: P,
    opts: SessionOpts,
    mut jobs: WorkEnumerator,
    size: u32,
) -> anyhow::Result<(RunReport, EnumerateStats)> {
    let mut session = GenerationSession::new(renderer, loader, interlock, opts)?;
    let report = session.run(&mut jobs, |_| SquareNormalizer::new(size))?;
    Ok((report, jobs.stats()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let enumerate = EnumerateOpts {
        filter: cli.filter.clone(),
        recursive: cli.recursive,
        variants: cli.angles.iter().copied().map(Variant::angle).collect(),
        exclude: vec![cli.staging_path.clone()],
        ..EnumerateOpts::default()
    };
    let jobs = WorkEnumerator::new(&cli.input, enumerate)
        .with_context(|| format!("scan '{}'", cli.input.display()))?;

    let renderer = CommandRenderer::new(CommandRendererOpts {
        dispatch: cli.dispatch_cmd.clone(),
        capture: cli.capture_cmd.clone(),
    })?;
    let loader = JsonJobLoader::new(cli.variant_field.clone())?;
    let opts = SessionOpts {
        workers: cli.workers,
        staging_path: cli.staging_path.clone(),
        stabilize: StabilizeOpts {
            sum_sq_threshold: cli.threshold,
            probe: cli.probe,
            probe_threshold: cli.probe_threshold,
            min_settle: Duration::from_millis(cli.min_settle_ms),
            timeout: cli.timeout_ms.map(Duration::from_millis),
            ..StabilizeOpts::default()
        },
        queue: QueueOpts {
            capacity: cli.queue_capacity,
            ..QueueOpts::default()
        },
    };

    let (report, scan) = match &cli.pause_file {
        Some(path) => run(
            renderer,
            loader,
            PauseFile::new(path),
            opts,
            jobs,
            cli.normalize_size,
        ),
        None => run(renderer, loader, NeverPaused, opts, jobs, cli.normalize_size),
    }?;

    tracing::info!(
        processed = report.jobs_processed,
        failed = report.jobs_failed,
        skipped = scan.jobs_skipped,
        dirs = scan.dirs_visited,
        persisted = report.pool.persisted,
        quarantined = report.pool.quarantined,
        "all done"
    );
    eprintln!(
        "generated {} artifact(s), {} failed, {} job(s) skipped",
        report.pool.persisted, report.pool.quarantined, scan.jobs_skipped
    );
    Ok(())
}
