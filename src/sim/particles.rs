//! Collision particles
//!
//! Purely visual: nothing in the simulation reads a particle back.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{PARTICLE_DECAY, PARTICLE_SPEED};

/// Default particle color handed to renderers
pub const PARTICLE_COLOR: &str = "#00ff88";

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at emission, removed once it reaches 0
    pub life: f32,
}

impl Particle {
    /// Advance one frame. Returns false once the particle has expired.
    #[inline]
    pub fn tick(&mut self, decay: f32) -> bool {
        self.pos += self.vel;
        self.life -= decay;
        self.life > 0.0
    }
}

/// Owns every live particle
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Max magnitude of each velocity component at emission
    speed: f32,
    /// Life lost per frame
    decay: f32,
    color: String,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(PARTICLE_SPEED, PARTICLE_DECAY)
    }
}

impl ParticleSystem {
    pub fn new(speed: f32, decay: f32) -> Self {
        Self {
            particles: Vec::new(),
            speed,
            decay,
            color: PARTICLE_COLOR.to_string(),
        }
    }

    /// Renderer color for every particle in this system
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    /// Emit `count` particles at `pos` with random velocities and full life
    pub fn emit<R: Rng + ?Sized>(&mut self, rng: &mut R, pos: Vec2, count: usize) {
        let s = self.speed;
        self.particles.reserve(count);
        for _ in 0..count {
            let vel = Vec2::new(rng.random_range(-s..=s), rng.random_range(-s..=s));
            self.particles.push(Particle {
                pos,
                vel,
                life: 1.0,
            });
        }
    }

    /// Move every particle, decay its life and drop the expired ones.
    ///
    /// Update and removal happen in the same compacting pass, so an expired
    /// particle is never visible after this returns.
    pub fn advance(&mut self) {
        let decay = self.decay;
        self.particles.retain_mut(|p| p.tick(decay));
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
