//! Runs the engine without a renderer and prints its reports as JSON lines.
//!
//! Commands can be fed from a file (one JSON command per line); otherwise a
//! seeded star system is generated.

use anyhow::{Context, Result};
use clap::Parser;
use orbit_engine::{Engine, EngineConfig, utils};

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orbit-headless")]
#[command(about = "Headless gravity simulation that prints state reports")]
struct Args {
    /// Engine config as JSON; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one JSON command per line, applied before the first tick
    #[arg(long)]
    commands: Option<PathBuf>,

    /// Number of bodies in the generated system (ignored with --commands)
    #[arg(short, long, default_value = "8")]
    bodies: usize,

    /// Seed for the generated system
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Number of ticks to run
    #[arg(short, long, default_value = "1000")]
    ticks: usize,

    /// Physical seconds per tick
    #[arg(long, default_value = "3600")]
    dt: f64,

    /// Print every n-th report
    #[arg(long, default_value = "1")]
    every: usize,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EngineConfig::from_json(&text).with_context(|| format!("loading config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let g = config.gravitational_constant;
    let mut engine = Engine::with_config(config);

    match &args.commands {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading commands {}", path.display()))?;
            // Bad lines are logged and skipped, as they would be from a live host.
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                let _ = engine.submit_json(line);
            }
        }
        None => {
            for command in utils::orbiting_disc(args.bodies, g, args.seed) {
                engine.apply(command)?;
            }
        }
    }
    log::info!("starting with {} bodies", engine.bodies().len());

    let every = args.every.max(1);
    let mut out = BufWriter::new(io::stdout().lock());
    for tick in 0..args.ticks {
        let report = engine.tick(args.dt);
        if tick % every == 0 {
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    log::info!(
        "finished {} ticks, {} bodies remain",
        engine.frame,
        engine.bodies().len()
    );
    Ok(())
}
