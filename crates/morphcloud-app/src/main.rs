mod keys;
mod renderer;
mod replay;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use morphcloud_core::{AnimationEngine, EngineConfig, FrameBuffers, GestureMapper, TemplateCatalog};
use morphcloud_platform::{FrameDriver, KeySource, Result};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::keys::StdinKeys;
use crate::renderer::LogRenderer;

/// Gesture-driven morphing point cloud.
#[derive(Parser, Debug)]
#[command(name = "morphcloud")]
#[command(version)]
struct Cli {
    /// Engine configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark recording (JSON) replayed as the hand tracker
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Frames to run; 0 runs until interrupted
    #[arg(long, default_value_t = 600)]
    frames: u64,

    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Fixed seed for template jitter and point sizes
    #[arg(long)]
    seed: Option<u64>,

    /// Viewport width / height used for the projection
    #[arg(long, default_value_t = 16.0 / 9.0)]
    aspect: f32,

    /// Log cloud statistics every N frames
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    info!("morphcloud starting");
    if let Err(e) = run(cli) {
        eprintln!("morphcloud error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut rng = match cli.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };

    let catalog = TemplateCatalog::generate(&config.templates, config.particle_count, &mut rng)?;
    let buffers = FrameBuffers::new(config.particle_count, &mut rng);
    let mut driver = FrameDriver::new(
        AnimationEngine::new(catalog, &config),
        buffers,
        GestureMapper::new(config.smoothing.decay_rate),
        config.camera.view_projection(cli.aspect),
    );
    driver.attach_tracking(replay::acquire(cli.replay.as_deref()));

    let mut renderer = LogRenderer::new(cli.report_every);
    driver.init_renderer(&mut renderer)?;
    let mut keys = StdinKeys::new();
    keys.start()?;

    let frame_time = Duration::from_secs_f32(1.0 / cli.fps.max(1.0));
    let started = Instant::now();
    let mut frame = 0u64;
    while cli.frames == 0 || frame < cli.frames {
        let frame_start = Instant::now();
        driver.drain_keys(&mut keys);
        driver.frame(started.elapsed(), &mut renderer)?;
        frame += 1;
        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    keys.stop()?;

    let current = driver
        .engine()
        .current_kind()
        .map_or("none", |kind| kind.name());
    info!("morphcloud finished after {frame} frames on {current}");
    Ok(())
}
