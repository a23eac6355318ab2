use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wx_fx_core::{
    Barometer, CommandBuffer, EngineConfig, FrameClock, FrameOutcome, FxMode, FxUpdate,
    GaugeReading, ParticleField, SharedMotionPreference, SurfaceGeometry, Trend, TweenAnimator,
};

/// Headless weather FX demo driven by a synthetic frame loop
#[derive(Parser, Debug)]
#[command(name = "wx-fx-demo")]
#[command(about = "Ambient weather particle field and barometer demo", long_about = None)]
struct Args {
    /// Particle mode (rain, snow, fog, dust)
    #[arg(short, long, default_value = "rain")]
    mode: FxMode,

    /// Intensity (0-1), usually precipitation probability / 100
    #[arg(short, long, default_value_t = 0.6)]
    intensity: f32,

    /// Wind speed in mph
    #[arg(short, long, default_value_t = 8.0)]
    wind_mph: f32,

    /// Global opacity (0-1); defaults to the configured value
    #[arg(long)]
    opacity: Option<f32>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Host frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Surface width (logical px)
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Surface height (logical px)
    #[arg(long, default_value_t = 480.0)]
    height: f32,

    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    dpr: f32,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Particles spawned/removed per frame while converging
    #[arg(long)]
    population_step: Option<usize>,

    /// Simulate a host that prefers reduced motion
    #[arg(long)]
    reduced_motion: bool,

    /// Halve the surface at this frame
    #[arg(long)]
    resize_at: Option<u64>,

    /// Pressure samples in hPa, comma separated (e.g. 1012,1015,1009)
    #[arg(long, value_delimiter = ',')]
    pressure: Vec<f32>,

    /// Frames between pressure samples
    #[arg(long, default_value_t = 120)]
    pressure_every: u64,

    /// Frames between report rows
    #[arg(short, long, default_value_t = 60)]
    report_every: u64,

    /// JSON engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measure convergence for every mode x intensity pair in parallel
    #[arg(long)]
    sweep: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

/// End-of-run summary
#[derive(Debug, Serialize)]
struct RunSummary {
    mode: FxMode,
    intensity: f32,
    wind_mph: f32,
    frames: u64,
    live: usize,
    target: usize,
    converged_at_frame: Option<u64>,
    suspended_frames: u64,
    draws_last_frame: usize,
    trend: Trend,
    gauge: Option<GaugeReading>,
}

/// One cell of the `--sweep` grid
#[derive(Debug, Serialize)]
struct SweepRow {
    mode: FxMode,
    intensity: f32,
    target: usize,
    frames_to_converge: Option<u64>,
}

const SWEEP_INTENSITIES: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    if let Some(step) = args.population_step {
        config.fx.population_step = step;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let config = config.validate();

    if args.sweep {
        run_sweep(&args, &config)
    } else {
        run_scene(&args, &config)
    }
}

fn new_field(args: &Args, config: &EngineConfig) -> ParticleField {
    let geometry = SurfaceGeometry::from_layout_capped(
        args.width,
        args.height,
        args.dpr,
        config.fx.max_device_pixel_ratio,
    );
    let field = ParticleField::with_config(config.fx, geometry);
    match config.seed {
        Some(seed) => field.with_seed(seed),
        None => field,
    }
}

fn run_scene(args: &Args, config: &EngineConfig) -> Result<(), Box<dyn Error>> {
    let motion = SharedMotionPreference::new(args.reduced_motion);
    let mut field = new_field(args, config).with_motion_preference(motion);

    let mut update = FxUpdate::new()
        .mode(args.mode)
        .intensity(args.intensity)
        .wind_mph(args.wind_mph);
    if let Some(opacity) = args.opacity {
        update = update.opacity(opacity);
    }
    field.set(update);

    let mut gauge = Barometer::new(config.gauge);
    let mut target_label = TweenAnimator::new(config.pop_duration_ms);
    let mut surface = CommandBuffer::with_capacity(config.fx.max_particles + 1);

    let frame_ms = 1000.0 / args.fps.max(1.0);
    let mut clock = FrameClock::with_max_dt(0.0, config.fx.max_dt);
    let mut converged_at_frame = None;
    let mut suspended_frames = 0;
    let mut last_target = None;
    let mut gauge_reading = None;

    if !args.json {
        let geometry = field.geometry();
        let (bw, bh) = geometry.backing_size();
        println!("=== Weather FX Demo ===\n");
        println!(
            "Surface: {:.0}x{:.0} logical, {}x{} backing (scale {})",
            geometry.width, geometry.height, bw, bh, geometry.scale
        );
        println!(
            "Mode: {}, intensity {:.2}, wind {}, opacity {}\n",
            field.state().mode,
            field.state().intensity,
            field.state().wind_mph,
            field.state().opacity
        );
        println!(" Frame | Time(s) | Live | Target | Draws | Pressure | Needle | Trend");
        println!("-------|---------|------|--------|-------|----------|--------|--------");
    }

    for frame in 1..=args.frames {
        let now_ms = frame as f64 * frame_ms;

        if args.resize_at == Some(frame) {
            let geometry = field.geometry();
            field.resize_to_layout(geometry.width / 2.0, geometry.height / 2.0, geometry.scale);
        }

        if args.pressure_every > 0 && (frame - 1) % args.pressure_every == 0 {
            let index = ((frame - 1) / args.pressure_every) as usize;
            if let Some(&pressure) = args.pressure.get(index).filter(|p| p.is_finite()) {
                gauge.submit(pressure, now_ms);
            }
        }

        let dt = clock.tick(now_ms);
        let outcome = field.step(dt, &mut surface);
        match outcome {
            FrameOutcome::Suspended => suspended_frames += 1,
            FrameOutcome::Drawn { live, target } => {
                if live == target && field.retiring_count() == 0 && converged_at_frame.is_none() {
                    converged_at_frame = Some(frame);
                }
                if last_target != Some(target) {
                    target_label.submit(target as f32, now_ms);
                    last_target = Some(target);
                }
            }
        }
        target_label.tick(now_ms);

        if let Some(reading) = gauge.tick(now_ms) {
            gauge_reading = Some(reading);
        }

        if !args.json && args.report_every > 0 && frame % args.report_every == 0 {
            let (pressure, needle) = gauge_reading
                .as_ref()
                .map_or((String::from("-"), String::from("-")), |r| {
                    (r.label.clone(), format!("{:.1}", r.needle_degrees))
                });
            println!(
                "{:6} | {:7.2} | {:4} | {:6} | {:5} | {:>8} | {:>6} | {}",
                frame,
                now_ms / 1000.0,
                field.live_count(),
                target_label.displayed_rounded().unwrap_or(0),
                surface.draw_count(),
                pressure,
                needle,
                gauge.trend()
            );
        }
    }

    let summary = RunSummary {
        mode: field.state().mode,
        intensity: *field.state().intensity,
        wind_mph: *field.state().wind_mph,
        frames: args.frames,
        live: field.live_count(),
        target: field.target_count(),
        converged_at_frame,
        suspended_frames,
        draws_last_frame: surface.draw_count(),
        trend: gauge.trend(),
        gauge: gauge.reading_at_rest(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n=== Run Complete ===");
        println!("Live particles: {} / target {}", summary.live, summary.target);
        match summary.converged_at_frame {
            Some(frame) => println!("Population converged at frame {frame}"),
            None => println!("Population did not converge"),
        }
        println!("Suspended frames: {}", summary.suspended_frames);
        if let Some(reading) = &summary.gauge {
            println!(
                "Barometer: {} ({}), needle {:.1} deg, hue {}",
                reading.label, summary.trend, reading.needle_degrees, reading.hue
            );
        }
    }

    Ok(())
}

fn run_sweep(args: &Args, config: &EngineConfig) -> Result<(), Box<dyn Error>> {
    let grid: Vec<(FxMode, f32)> = FxMode::ALL
        .iter()
        .flat_map(|&mode| SWEEP_INTENSITIES.iter().map(move |&i| (mode, i)))
        .collect();

    info!("Sweeping {} mode/intensity pairs", grid.len());

    let rows: Vec<SweepRow> = grid
        .par_iter()
        .map(|&(mode, intensity)| {
            let mut field = new_field(args, config);
            field.set(
                FxUpdate::new()
                    .mode(mode)
                    .intensity(intensity)
                    .wind_mph(args.wind_mph),
            );

            let mut surface = CommandBuffer::new();
            let dt = (1.0 / args.fps.max(1.0)) as f32;
            let mut frames_to_converge = None;
            for frame in 1..=args.frames {
                let outcome = field.step(dt, &mut surface);
                match outcome {
                    FrameOutcome::Drawn { live, target }
                        if live == target && field.retiring_count() == 0 =>
                    {
                        frames_to_converge = Some(frame);
                        break;
                    }
                    _ => {}
                }
            }

            SweepRow {
                mode,
                intensity,
                target: field.target_count(),
                frames_to_converge,
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Mode | Intensity | Target | Frames to converge");
    println!("-----|-----------|--------|-------------------");
    for row in &rows {
        let frames = row
            .frames_to_converge
            .map_or_else(|| String::from("suspended"), |f| f.to_string());
        println!(
            "{:4} | {:9.2} | {:6} | {}",
            row.mode.name(),
            row.intensity,
            row.target,
            frames
        );
    }

    Ok(())
}
