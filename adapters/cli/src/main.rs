#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the Bomb Arena engine.
//!
//! Loads an ASCII stage map and an optional JSON scenario, replays the
//! scripted actions at a fixed simulation step and prints what happened.

mod effects;
mod scenario;
mod session;
mod sinks;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bomb_arena_world::parse_layout;
use clap::Parser;

use crate::{scenario::Scenario, session::Session};

/// Replays a bomb arena scenario without rendering.
#[derive(Debug, Parser)]
#[command(name = "bomb-arena", version, about)]
struct Args {
    /// ASCII stage map (`#` wall, `+` crate, `D` dynamite, `^` power floor, `f`/`b` items).
    #[arg(value_name = "MAP")]
    map: PathBuf,

    /// JSON scenario with engine configuration, hidden items and scripted actions.
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Seed used to shuffle the hidden item reveal order.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 5.0)]
    seconds: f32,

    /// Length of a simulation step in milliseconds.
    #[arg(long, default_value_t = 16, value_name = "MS")]
    step_ms: u64,
}

/// Entry point for the Bomb Arena command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let duration = Duration::try_from_secs_f32(args.seconds)
        .with_context(|| format!("--seconds {} is not a usable duration", args.seconds))?;

    let map = fs::read_to_string(&args.map)
        .with_context(|| format!("failed to read stage map {}", args.map.display()))?;
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };

    let mut layout = parse_layout(&map, args.seed)
        .with_context(|| format!("failed to parse stage map {}", args.map.display()))?;
    layout.hidden_items = scenario.hidden_items.clone();
    log::info!(
        "running {} for {}s with {} scripted steps",
        args.map.display(),
        args.seconds,
        scenario.steps.len()
    );

    let mut session = Session::new(scenario.config.clone(), layout);
    let summary = session.run(
        &scenario.steps,
        duration,
        Duration::from_millis(args.step_ms),
    );
    println!("{summary}");
    Ok(())
}
