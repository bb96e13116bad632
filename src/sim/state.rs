//! Simulation state and core entity types
//!
//! [`Simulation`] owns every entity. Renderers only ever see it through the
//! read-only accessors or an owned [`FrameSnapshot`].

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::{Obstacle, ObstacleField, ObstacleKind};
use super::particles::{Particle, ParticleSystem};
use crate::config::SimConfig;
use crate::polar_to_cartesian;

/// Fixed rectangular bounds, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl From<&SimConfig> for Arena {
    fn from(config: &SimConfig) -> Self {
        Self::new(config.arena_width, config.arena_height)
    }
}

/// Display color. The simulation only generates and carries it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Degrees, [0, 360)
    pub hue: f32,
    /// Percent
    pub saturation: f32,
    /// Percent
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32) -> Self {
        Self {
            hue,
            saturation: 70.0,
            lightness: 50.0,
        }
    }

    /// Random hue at the standard saturation/lightness
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random_range(0.0..360.0))
    }

    /// CSS color string, e.g. `hsl(120, 70%, 50%)`
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per frame
    pub vel: Vec2,
    pub radius: f32,
    pub color: Hsl,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: Hsl) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            color,
        }
    }

    /// New ball at the arena center heading in a uniformly random direction
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        arena: &Arena,
        speed: f32,
        radius: f32,
        rng: &mut R,
    ) -> Self {
        let color = Hsl::random(rng);
        let angle = rng.random_range(0.0..TAU);
        Self::new(id, arena.center(), polar_to_cartesian(speed, angle), radius, color)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Move by one frame of velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Pull the realized x position toward the pointer.
    ///
    /// Only position changes; the stored velocity is left alone so pointer
    /// tracking never alters bounces.
    #[inline]
    pub fn follow_pointer(&mut self, target_x: f32, factor: f32) {
        self.pos.x += (target_x - self.pos.x) * factor;
    }

    /// Rescale velocity up to `min_speed` if it has dropped below it
    pub fn enforce_min_speed(&mut self, min_speed: f32) {
        let speed = self.speed();
        if speed >= min_speed {
            return;
        }
        if speed < f32::EPSILON {
            // No direction to preserve, use heading 0
            self.vel = Vec2::new(min_speed, 0.0);
        } else {
            self.vel *= min_speed / speed;
        }
    }
}

/// Arena wall a ball pushed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl WallSide {
    /// Direction pointing back into the arena (y grows downward)
    pub fn base_angle(self) -> f32 {
        match self {
            WallSide::Left => 0.0,
            WallSide::Right => PI,
            WallSide::Top => FRAC_PI_2,
            WallSide::Bottom => -FRAC_PI_2,
        }
    }
}

/// What a ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BounceKind {
    Wall(WallSide),
    Rectangle,
    Triangle,
}

impl From<ObstacleKind> for BounceKind {
    fn from(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Rectangle => BounceKind::Rectangle,
            ObstacleKind::Triangle => BounceKind::Triangle,
        }
    }
}

/// A bounce resolved during the last step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceEvent {
    pub ball_id: u32,
    pub kind: BounceKind,
    /// Ball position when the bounce resolved (where particles were emitted)
    pub pos: Vec2,
}

/// Owned view of one frame, handed to renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub arena: Arena,
    pub balls: Vec<Ball>,
    pub obstacles: Vec<Obstacle>,
    /// Bumped on every obstacle regeneration
    pub obstacle_generation: u32,
    pub particles: Vec<Particle>,
    pub particle_color: String,
    pub bounces: Vec<BounceEvent>,
    pub background_present: bool,
}

/// Complete simulation state (single owner, seeded)
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) arena: Arena,
    /// Seed for reproducibility
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    /// Active balls (in spawn order)
    pub(crate) balls: Vec<Ball>,
    pub(crate) obstacles: ObstacleField,
    /// Visual particles
    pub(crate) particles: ParticleSystem,
    /// Bounces resolved during the last step
    pub(crate) bounces: Vec<BounceEvent>,
    /// Steps taken so far
    pub(crate) frame: u64,
    pub(crate) background_present: bool,
    next_id: u32,
}

impl Simulation {
    /// Create a simulation with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    /// Create a simulation with custom tuning.
    ///
    /// The config is sanitized first. One ball is spawned immediately.
    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        let config = config.sanitized();
        let arena = Arena::from(&config);
        let particles = ParticleSystem::new(config.particle_speed, config.particle_decay);

        let mut sim = Self {
            config,
            arena,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            balls: Vec::new(),
            obstacles: ObstacleField::default(),
            particles,
            bounces: Vec::new(),
            frame: 0,
            background_present: false,
            next_id: 1,
        };

        sim.spawn_ball();
        sim
    }

    /// Allocate a new entity ID. Balls and obstacles share the sequence.
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a ball at the arena center with a random heading. Returns its id.
    pub fn spawn_ball(&mut self) -> u32 {
        let id = self.next_entity_id();
        let ball = Ball::spawn(
            id,
            &self.arena,
            self.config.ball_start_speed,
            self.config.ball_radius,
            &mut self.rng,
        );
        log::info!(
            "Spawned ball {} heading ({:.2}, {:.2})",
            id,
            ball.vel.x,
            ball.vel.y
        );
        self.balls.push(ball);
        id
    }

    /// Remove a ball from the registry
    pub fn remove_ball(&mut self, id: u32) -> Option<Ball> {
        let idx = self.balls.iter().position(|b| b.id == id)?;
        log::info!("Removed ball {}", id);
        Some(self.balls.remove(idx))
    }

    /// Replace the whole obstacle set with a fresh random batch
    pub fn regenerate_obstacles(&mut self) {
        self.obstacles
            .regenerate(&mut self.rng, &self.arena, &self.config, &mut self.next_id);
    }

    /// Record whether the host has a background image (renderer concern only)
    pub fn set_background_present(&mut self, present: bool) {
        self.background_present = present;
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.obstacles.as_slice()
    }

    /// Number of times the obstacle set has been regenerated
    pub fn obstacle_generation(&self) -> u32 {
        self.obstacles.generation()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    /// Bounces resolved by the last [`Simulation::step`]
    pub fn bounces(&self) -> &[BounceEvent] {
        &self.bounces
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn background_present(&self) -> bool {
        self.background_present
    }

    /// Copy the current frame out for a renderer
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            arena: self.arena,
            balls: self.balls.clone(),
            obstacles: self.obstacles.as_slice().to_vec(),
            obstacle_generation: self.obstacles.generation(),
            particles: self.particles.as_slice().to_vec(),
            particle_color: self.particles.color().to_string(),
            bounces: self.bounces.clone(),
            background_present: self.background_present,
        }
    }
}
