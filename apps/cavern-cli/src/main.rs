use cavern_common::CaveConfig;
use cavern_input::InputEvent;
use cavern_interact::{LogAudio, LogDisplay, Selection, Session};
use cavern_populate::{Cave, generate};
use cavern_render::{DebugTextRenderer, Renderer};
use cavern_tools::PopulationInspector;
use clap::{Parser, Subcommand};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cavern-cli", about = "Headless runner for the cave explorer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a cave and print its contents
    Generate {
        /// RNG seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        /// List every object
        #[arg(short, long)]
        list: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check placement bounds over many seeds
    Audit {
        /// Number of consecutive seeds to check
        #[arg(short, long, default_value = "32")]
        seeds: u64,
    },
    /// Run the frame loop with a scripted pointer sweep and clicks
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Frames per second of simulated time
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Click every N frames
        #[arg(long, default_value = "90")]
        click_every: u64,
        /// RNG seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CaveConfig> {
    Ok(match path {
        Some(path) => CaveConfig::load(path)?,
        None => CaveConfig::default(),
    })
}

fn build_cave(config: &CaveConfig, seed: Option<u64>) -> (Cave, u64) {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "generating cave");
    let cave = generate(&config.population, &mut SmallRng::seed_from_u64(seed));
    (cave, seed)
}

/// Pointer path for the scripted run: a slow figure-eight across the view.
fn sweep(frame: u64) -> Vec2 {
    let t = frame as f32 * 0.02;
    Vec2::new(t.sin() * 0.8, (2.0 * t).sin() * 0.4 - 0.1)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("cavern-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cavern_render::crate_info());
            println!("tools: {}", cavern_tools::crate_info());
            let p = &config.population;
            println!(
                "population: {} stalagmites, {} floor clusters, {} stalactites, {} bacteria, {} bats, {} olms",
                p.stalagmite_count,
                p.floor_cluster_count,
                p.stalactite_count,
                p.bacteria_count,
                p.bat_count,
                p.olm_count
            );
        }
        Commands::Generate { seed, list, json } => {
            let (cave, seed) = build_cave(&config, seed);
            let summary = PopulationInspector::summary(&cave.population);
            if json {
                let objects = list.then(|| PopulationInspector::list(&cave.population));
                let doc = serde_json::json!({
                    "seed": seed,
                    "summary": summary,
                    "objects": objects,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("seed={seed}");
                println!("{summary}");
                if list {
                    for info in PopulationInspector::list(&cave.population) {
                        println!("{info}");
                    }
                }
            }
        }
        Commands::Audit { seeds } => {
            let mut failures = 0usize;
            for seed in 0..seeds {
                let (cave, _) = build_cave(&config, Some(seed));
                let violations = PopulationInspector::audit_bounds(&cave.population, &config.population);
                for v in &violations {
                    println!("seed {seed}: #{} {} at {:?}", v.id, v.kind, v.position);
                }
                failures += violations.len();
            }
            println!("Audited {seeds} seeds: {failures} violations");
            if failures > 0 {
                anyhow::bail!("{failures} objects placed outside their bounds");
            }
        }
        Commands::Simulate {
            frames,
            fps,
            click_every,
            seed,
        } => {
            let (cave, seed) = build_cave(&config, seed);
            let mut session = Session::new(
                cave.population,
                &config,
                LogDisplay::default(),
                LogAudio::default(),
            );
            session.input(InputEvent::Resized {
                width: 1280,
                height: 720,
            });
            session.start();

            let dt = 1.0 / fps.max(1) as f32;
            let mut selections = 0usize;
            let mut misses = 0usize;
            for frame in 0..frames {
                session.input(InputEvent::PointerMoved(sweep(frame)));
                if click_every > 0 && frame % click_every == click_every - 1 {
                    session.input(InputEvent::Click);
                }
                let report = session.tick(frame as f32 * dt);
                match report.selection {
                    Some(Selection::Shown { .. }) => selections += 1,
                    Some(Selection::Hidden) => misses += 1,
                    None => {}
                }
            }

            print!(
                "{}",
                DebugTextRenderer::new().render(session.population(), &session.view())
            );
            println!(
                "Simulated {} frames (seed={seed}): {selections} selections, {misses} misses, {} cues, {} pulses pending",
                session.frames(),
                session.audio().cues,
                session.pending_pulses()
            );
            if let Some(title) = &session.display().current {
                println!("Info card: {title}");
            }
        }
    }

    Ok(())
}
