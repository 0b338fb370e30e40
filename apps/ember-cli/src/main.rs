mod demo;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ember_kernel::{Game, GameSettings, ManualClock};
use ember_render::{Platform, RecordingGraphics, VirtualWindow};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ember-cli", about = "Run and inspect ember games")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print settings as YAML: the defaults, or a validated settings file
    Settings {
        /// Settings file to validate and print
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Run the arena demo with a simulated clock
    Run {
        /// Number of iterations before closing
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Seconds per iteration fed to the loop
        #[arg(short, long, default_value_t = 1.0 / 60.0)]
        delta: f64,
        /// Render into a virtual window instead of running headless
        #[arg(short, long)]
        windowed: bool,
        /// YAML settings file; `--windowed` decides headless mode
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("ember-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("engine: {}", ember_kernel::VERSION);
            println!("common: {}", ember_common::crate_info());
            println!("content: {}", ember_content::crate_info());
            println!("render: {}", ember_render::crate_info());
            println!("kernel: {}", ember_kernel::crate_info());
        }
        Commands::Settings { file } => {
            let settings = match file {
                Some(path) => GameSettings::from_yaml_file(&path)
                    .with_context(|| format!("failed to load settings from {}", path.display()))?,
                None => GameSettings::default(),
            };
            print!("{}", settings.to_yaml()?);
        }
        Commands::Run {
            frames,
            delta,
            windowed,
            settings,
        } => run_demo(frames, delta, windowed, settings)?,
    }

    Ok(())
}

fn run_demo(
    frames: u64,
    delta: f64,
    windowed: bool,
    settings_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let settings = match settings_path {
        Some(path) => GameSettings::from_yaml_file(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => GameSettings::default().with_title("Ember Arena"),
    }
    .with_headless(!windowed);

    println!(
        "Arena demo: frames={frames}, delta={delta:.4}s, mode={}",
        if windowed { "windowed" } else { "headless" }
    );

    let stats = demo::SharedStats::default();
    let gfx = RecordingGraphics::new();
    let window = VirtualWindow::new(settings.title.clone(), settings.size);

    let mut game = Game::new(settings, demo::build_scene(&stats))
        .with_clock(ManualClock::constant(delta))
        .with_hooks(demo::FrameLimit::new(frames));
    if windowed {
        game = game.with_platform(Platform::new(window, gfx.clone()));
    }
    game.run().context("demo run failed")?;

    let time = game.context().time;
    let stats = *stats.borrow();
    println!(
        "Frames: {}, fixed ticks: {}, elapsed: {:.2}s",
        time.frame(),
        time.fixed_ticks(),
        time.elapsed()
    );
    println!(
        "Waves: {}, spawned: {}, culled: {}, live enemies at exit: {}",
        stats.waves, stats.spawned, stats.culled, stats.live_enemies
    );
    if windowed {
        println!(
            "Rendered frames: {}, draw commands: {}",
            gfx.frames(),
            gfx.commands().len()
        );
        tracing::debug!("last recording:\n{}", gfx.to_text());
    }
    Ok(())
}
