//! Shape Bounce headless runner
//!
//! Native hosts have no renderer; this drives the simulation for a fixed
//! number of frames and prints the final frame as JSON.
//!
//! Usage: `shape-bounce [frames] [seed] [config.json]`
//! Set `RUST_LOG=debug` for periodic statistics.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use shape_bounce::sim::{BounceKind, Simulation, TickInput};
#[cfg(not(target_arch = "wasm32"))]
use shape_bounce::SimConfig;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FRAMES: u64 = 600;
/// A ball is added this often until `MAX_BALLS` are in play
#[cfg(not(target_arch = "wasm32"))]
const SPAWN_INTERVAL: u64 = 120;
#[cfg(not(target_arch = "wasm32"))]
const MAX_BALLS: usize = 5;
/// Obstacles are reshuffled this often
#[cfg(not(target_arch = "wasm32"))]
const REGENERATE_INTERVAL: u64 = 300;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Shape Bounce (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let frames = args
        .first()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let seed = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(time_seed);
    let config = args.get(2).map(String::as_str).map(load_config).unwrap_or_default();

    let mut sim = Simulation::with_config(seed, config);
    log::info!("Simulation initialized with seed: {}", seed);
    sim.regenerate_obstacles();

    let width = sim.arena().width;
    let mut wall_hits = 0u64;
    let mut obstacle_hits = 0u64;

    for frame in 0..frames {
        if frame > 0 && frame % SPAWN_INTERVAL == 0 && sim.balls().len() < MAX_BALLS {
            sim.spawn_ball();
        }
        if frame > 0 && frame % REGENERATE_INTERVAL == 0 {
            sim.regenerate_obstacles();
        }

        // Sweep the pointer back and forth across the arena
        let target_x = width / 2.0 + (frame as f32 * 0.02).sin() * width / 3.0;
        sim.step(&TickInput::new(target_x));

        for bounce in sim.bounces() {
            match bounce.kind {
                BounceKind::Wall(_) => wall_hits += 1,
                BounceKind::Rectangle | BounceKind::Triangle => obstacle_hits += 1,
            }
        }
    }

    log::info!(
        "Ran {} frames: {} wall bounces, {} obstacle bounces, {} live particles",
        sim.frame(),
        wall_hits,
        obstacle_hits,
        sim.particles().len()
    );

    match serde_json::to_string_pretty(&sim.snapshot()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read a JSON config, falling back to defaults on any error
#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> SimConfig {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not read config {}: {}, using defaults", path, e);
            return SimConfig::default();
        }
    };
    match SimConfig::from_json(&json) {
        Ok(config) => {
            log::info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            log::warn!("Invalid config {}: {}, using defaults", path, e);
            SimConfig::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
