//! Browser adapter
//!
//! Thin wasm-bindgen wrapper: JS pointer/touch handlers write the target X,
//! button handlers trigger spawns and regeneration, and each animation frame
//! callback runs one step and pulls a JSON snapshot to draw. The host's
//! frame rate is the simulation rate.

use wasm_bindgen::prelude::*;

use crate::config::SimConfig;
use crate::sim::{Simulation, TickInput};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Shape Bounce starting...");
}

/// Simulation handle owned by the JS host
#[wasm_bindgen]
pub struct WebSimulation {
    sim: Simulation,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSimulation {
    /// New simulation seeded from the current time
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSimulation {
        let seed = js_sys::Date::now() as u64;
        Self::from_simulation(Simulation::new(seed))
    }

    /// New simulation with a fixed seed and JSON tuning overrides
    pub fn with_config(seed: u64, config_json: &str) -> Result<WebSimulation, JsError> {
        let config = SimConfig::from_json(config_json)?;
        Ok(Self::from_simulation(Simulation::with_config(seed, config)))
    }

    /// Pointer X in arena coordinates
    pub fn set_pointer_x(&mut self, x: f32) {
        self.input.target_x = x;
    }

    pub fn add_ball(&mut self) -> u32 {
        self.sim.spawn_ball()
    }

    pub fn regenerate_obstacles(&mut self) {
        self.sim.regenerate_obstacles();
    }

    pub fn set_background_present(&mut self, present: bool) {
        self.sim.set_background_present(present);
    }

    /// Run one step; call once per animation frame.
    /// Returns the frame counter after the step.
    pub fn frame(&mut self) -> u64 {
        self.sim.step(&self.input);
        self.sim.frame()
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.sim.snapshot())?)
    }

    pub fn ball_count(&self) -> usize {
        self.sim.balls().len()
    }

    pub fn particle_count(&self) -> usize {
        self.sim.particles().len()
    }

    pub fn arena_width(&self) -> f32 {
        self.sim.arena().width
    }

    pub fn arena_height(&self) -> f32 {
        self.sim.arena().height
    }
}

impl WebSimulation {
    fn from_simulation(sim: Simulation) -> WebSimulation {
        log::info!("Simulation initialized with seed: {}", sim.seed());
        let input = TickInput::new(sim.arena().center().x);
        WebSimulation { sim, input }
    }
}

impl Default for WebSimulation {
    fn default() -> Self {
        Self::new()
    }
}
