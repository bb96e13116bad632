//! Simulation tuning
//!
//! Every constant in [`crate::consts`] can be overridden from JSON. Missing
//! fields fall back to the defaults, so a config file only needs the values
//! it changes.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Balls ===
    pub ball_radius: f32,
    /// Speed of a freshly spawned ball
    pub ball_start_speed: f32,
    pub ball_min_speed: f32,
    pub ball_max_speed: f32,
    /// Horizontal pull toward the pointer (0 = ignore pointer, 1 = snap)
    pub pointer_follow: f32,
    /// Wall bounce jitter around the inward direction (radians)
    pub bounce_jitter: f32,

    // === Particles ===
    pub wall_burst: usize,
    pub rect_burst: usize,
    pub triangle_burst: usize,
    pub particle_speed: f32,
    pub particle_decay: f32,

    // === Obstacles ===
    pub obstacle_min_count: u32,
    pub obstacle_max_count: u32,
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    pub obstacle_margin: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            ball_radius: BALL_RADIUS,
            ball_start_speed: BALL_START_SPEED,
            ball_min_speed: BALL_MIN_SPEED,
            ball_max_speed: BALL_MAX_SPEED,
            pointer_follow: POINTER_FOLLOW,
            bounce_jitter: BOUNCE_JITTER,

            wall_burst: WALL_BURST,
            rect_burst: RECT_BURST,
            triangle_burst: TRIANGLE_BURST,
            particle_speed: PARTICLE_SPEED,
            particle_decay: PARTICLE_DECAY,

            obstacle_min_count: OBSTACLE_MIN_COUNT,
            obstacle_max_count: OBSTACLE_MAX_COUNT,
            obstacle_min_size: OBSTACLE_MIN_SIZE,
            obstacle_max_size: OBSTACLE_MAX_SIZE,
            obstacle_margin: OBSTACLE_MARGIN,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Return a copy whose values the simulation can run with.
    ///
    /// Out-of-range values are corrected rather than rejected; each
    /// correction is logged. JSON numbers beyond the f32 range arrive as
    /// infinity and are treated like any other invalid value.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut cfg = self.clone();

        if !(positive(cfg.arena_width) && positive(cfg.arena_height)) {
            log::warn!(
                "Arena {}x{} invalid, using {}x{}",
                cfg.arena_width,
                cfg.arena_height,
                defaults.arena_width,
                defaults.arena_height
            );
            cfg.arena_width = defaults.arena_width;
            cfg.arena_height = defaults.arena_height;
        }

        if !positive(cfg.ball_radius) {
            log::warn!("Ball radius {} invalid, using {}", cfg.ball_radius, defaults.ball_radius);
            cfg.ball_radius = defaults.ball_radius;
        }

        // Min speed doubles as the rescale target, so it must stay positive
        if !positive(cfg.ball_min_speed) {
            log::warn!(
                "Min speed {} invalid, using {}",
                cfg.ball_min_speed,
                defaults.ball_min_speed
            );
            cfg.ball_min_speed = defaults.ball_min_speed;
        }
        if !(cfg.ball_max_speed >= cfg.ball_min_speed && cfg.ball_max_speed <= MAX_MAGNITUDE) {
            let max = if positive(cfg.ball_max_speed) {
                cfg.ball_max_speed
            } else {
                defaults.ball_max_speed
            };
            log::warn!(
                "Max speed {} invalid for min speed {}, using {}",
                cfg.ball_max_speed,
                cfg.ball_min_speed,
                max.max(cfg.ball_min_speed)
            );
            cfg.ball_max_speed = max.max(cfg.ball_min_speed);
        }
        if !(cfg.ball_start_speed.abs() <= MAX_MAGNITUDE) {
            log::warn!(
                "Start speed {} invalid, using {}",
                cfg.ball_start_speed,
                defaults.ball_start_speed
            );
            cfg.ball_start_speed = defaults.ball_start_speed;
        }

        if !(0.0..=1.0).contains(&cfg.pointer_follow) {
            log::warn!("Pointer follow {} outside [0, 1], clamping", cfg.pointer_follow);
            cfg.pointer_follow = if cfg.pointer_follow.is_nan() {
                defaults.pointer_follow
            } else {
                cfg.pointer_follow.clamp(0.0, 1.0)
            };
        }
        // Beyond a full turn the jitter range adds nothing
        if !(0.0..=TAU).contains(&cfg.bounce_jitter) {
            log::warn!(
                "Bounce jitter {} outside [0, 2pi], using {}",
                cfg.bounce_jitter,
                defaults.bounce_jitter
            );
            cfg.bounce_jitter = defaults.bounce_jitter;
        }

        if !(0.0..=MAX_MAGNITUDE).contains(&cfg.particle_speed) {
            log::warn!(
                "Particle speed {} invalid, using {}",
                cfg.particle_speed,
                defaults.particle_speed
            );
            cfg.particle_speed = defaults.particle_speed;
        }
        // A non-positive decay would keep particles alive forever
        if !positive(cfg.particle_decay) {
            log::warn!(
                "Particle decay {} invalid, using {}",
                cfg.particle_decay,
                defaults.particle_decay
            );
            cfg.particle_decay = defaults.particle_decay;
        }

        if cfg.obstacle_max_count < cfg.obstacle_min_count {
            log::warn!(
                "Obstacle count range {}..={} inverted, swapping",
                cfg.obstacle_min_count,
                cfg.obstacle_max_count
            );
            std::mem::swap(&mut cfg.obstacle_min_count, &mut cfg.obstacle_max_count);
        }
        if !positive(cfg.obstacle_min_size) {
            log::warn!(
                "Obstacle min size {} invalid, using {}",
                cfg.obstacle_min_size,
                defaults.obstacle_min_size
            );
            cfg.obstacle_min_size = defaults.obstacle_min_size;
        }
        if !(cfg.obstacle_max_size >= cfg.obstacle_min_size
            && cfg.obstacle_max_size <= MAX_MAGNITUDE)
        {
            let max = if positive(cfg.obstacle_max_size) {
                cfg.obstacle_max_size
            } else {
                defaults.obstacle_max_size
            };
            log::warn!(
                "Obstacle size range {}..{} invalid, using max {}",
                cfg.obstacle_min_size,
                cfg.obstacle_max_size,
                max.max(cfg.obstacle_min_size)
            );
            cfg.obstacle_max_size = max.max(cfg.obstacle_min_size);
        }

        let max_margin = cfg.arena_width.min(cfg.arena_height) / 2.0;
        if !(0.0..=max_margin).contains(&cfg.obstacle_margin) {
            log::warn!(
                "Obstacle margin {} does not fit the arena, clamping to {}",
                cfg.obstacle_margin,
                max_margin
            );
            cfg.obstacle_margin = if cfg.obstacle_margin.is_nan() {
                0.0
            } else {
                cfg.obstacle_margin.clamp(0.0, max_margin)
            };
        }

        cfg
    }
}

/// Largest length or speed a config may carry. Keeps every random range
/// width finite.
const MAX_MAGNITUDE: f32 = 1.0e6;

/// Finite, strictly positive and no larger than [`MAX_MAGNITUDE`]
fn positive(value: f32) -> bool {
    value > 0.0 && value <= MAX_MAGNITUDE
}
