//! Shape Bounce - balls bouncing through a field of random obstacles
//!
//! Core modules:
//! - `sim`: Seeded simulation (balls, obstacles, collisions, particles)
//! - `config`: Data-driven tuning of the simulation constants
//! - `web`: wasm-bindgen adapter for browser hosts (wasm32 only)
//!
//! Rendering and raw pointer capture live outside this crate. A host feeds
//! the pointer X coordinate in through [`sim::TickInput`] and draws whatever
//! [`sim::Simulation::snapshot`] hands back.

pub mod config;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::SimConfig;
pub use sim::{Simulation, TickInput};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    use std::f32::consts::FRAC_PI_3;

    /// Arena dimensions (9:16 portrait)
    pub const ARENA_WIDTH: f32 = 450.0;
    pub const ARENA_HEIGHT: f32 = 800.0;

    /// Ball defaults (speeds are units per frame)
    pub const BALL_RADIUS: f32 = 15.0;
    pub const BALL_START_SPEED: f32 = 10.0;
    /// Speed is raised back to this whenever it drops below
    pub const BALL_MIN_SPEED: f32 = 5.0;
    /// Upper bound of the randomized bounce speed
    pub const BALL_MAX_SPEED: f32 = 15.0;

    /// Fraction of the remaining horizontal distance to the pointer closed each frame
    pub const POINTER_FOLLOW: f32 = 0.05;
    /// Max angular deviation of a wall bounce from the wall's inward direction (60°)
    pub const BOUNCE_JITTER: f32 = FRAC_PI_3;

    /// Particles emitted per collision kind
    pub const WALL_BURST: usize = 15;
    pub const RECT_BURST: usize = 15;
    pub const TRIANGLE_BURST: usize = 20;

    /// Particle velocity components are drawn from [-PARTICLE_SPEED, PARTICLE_SPEED]
    pub const PARTICLE_SPEED: f32 = 2.0;
    /// Life lost per frame (life starts at 1.0, so ~50 frames)
    pub const PARTICLE_DECAY: f32 = 0.02;

    /// Obstacle generation
    pub const OBSTACLE_MIN_COUNT: u32 = 3;
    pub const OBSTACLE_MAX_COUNT: u32 = 7;
    pub const OBSTACLE_MIN_SIZE: f32 = 50.0;
    pub const OBSTACLE_MAX_SIZE: f32 = 150.0;
    /// Obstacle anchors stay this far from every arena edge
    pub const OBSTACLE_MARGIN: f32 = 50.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Direction of `v` in radians.
///
/// The zero vector has no direction; it is defined as heading 0 so a ball
/// sitting exactly on an obstacle center still gets a finite velocity.
#[inline]
pub fn heading(v: Vec2) -> f32 {
    if v.length_squared() <= f32::EPSILON {
        0.0
    } else {
        v.y.atan2(v.x)
    }
}
