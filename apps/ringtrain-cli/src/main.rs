mod script;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ringtrain_common::SceneConfig;
use ringtrain_input::{Action, InputTuning};
use ringtrain_kernel::{Formation, Scene};
use ringtrain_render::{DebugTextRenderer, Renderer};
use ringtrain_tools::SceneInspector;
use script::{InputScript, ScriptStep};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringtrain-cli", about = "Headless ring train simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective scene configuration
    Info,
    /// Print every car position at one simulated time
    Formation {
        /// Simulated time
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the frame loop without a window and dump frames
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Action held on every frame (repeatable)
        #[arg(long)]
        hold: Vec<Action>,
        /// Action held on a single frame, as FRAME:ACTION (repeatable)
        #[arg(long)]
        press: Vec<ScriptStep>,
        /// Print every Nth frame
        #[arg(long, default_value = "1")]
        every: u64,
        /// List every car in each printed frame
        #[arg(long)]
        cars: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("ringtrain-cli v{}", env!("CARGO_PKG_VERSION"));
            let bindings: Vec<&str> = Action::ALL.iter().map(|a| a.name()).collect();
            println!("actions: {}", bindings.join(", "));
            print!("{}", serde_yaml::to_string(&config)?);
        }
        Commands::Formation { time, json } => {
            let formation = Formation::new(config.formation.count, config.formation.radius)?;
            let positions = formation.positions(time);
            if json {
                println!("{}", serde_json::to_string_pretty(&positions)?);
            } else {
                println!(
                    "Formation: cars={} radius={} t={time}",
                    formation.count(),
                    formation.radius()
                );
                for (i, p) in positions.iter().enumerate() {
                    let marker = if i == formation.anchor_index() {
                        " (anchor)"
                    } else {
                        ""
                    };
                    println!("  car[{i}] ({:.4}, {:.4}, {:.4}){marker}", p.x, p.y, p.z);
                }
            }
        }
        Commands::Simulate {
            frames,
            hold,
            press,
            every,
            cars,
            json,
        } => {
            anyhow::ensure!(every > 0, "--every must be at least 1");

            let mut scene = Scene::from_config(&config)?;
            let script = InputScript {
                hold,
                presses: press,
            };
            let shown = script::simulate(
                &mut scene,
                &script,
                InputTuning::from(&config.motion),
                frames,
                every,
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                let renderer = DebugTextRenderer { verbose: cars };
                for f in &shown {
                    print!("[{}] {}", f.frame, renderer.render(&f.transforms));
                }
                println!("{}", SceneInspector::summary(&scene));
                if cars {
                    for index in 0..scene.formation().count() {
                        if let Some(car) = SceneInspector::inspect_car(&scene, index) {
                            println!("  {car}");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
