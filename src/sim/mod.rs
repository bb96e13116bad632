//! Seeded simulation module
//!
//! All simulation logic lives here. This module must stay reproducible:
//! - One step per frame, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (spawn order for balls, set order for obstacles)
//! - No rendering or platform dependencies

pub mod collision;
pub mod obstacles;
pub mod particles;
pub mod state;
pub mod tick;

pub use collision::{ObstacleHit, WallContacts, obstacle_contact, randomized_bounce, wall_contacts};
pub use obstacles::{Obstacle, ObstacleField, ObstacleKind, ObstacleShape};
pub use particles::{PARTICLE_COLOR, Particle, ParticleSystem};
pub use state::{Arena, Ball, BounceEvent, BounceKind, FrameSnapshot, Hsl, Simulation, WallSide};
pub use tick::TickInput;
