//! Collision detection and bounce response
//!
//! Bounces are stylized rather than physical: the new velocity gets a fresh
//! random speed and a direction chosen from the contact, not a mirrored
//! copy of the old one.

use glam::Vec2;
use rand::Rng;

use super::obstacles::{Obstacle, ObstacleKind, ObstacleShape};
use super::state::{Arena, WallSide};
use crate::{heading, polar_to_cartesian};

/// Walls a ball overlaps, one per axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContacts {
    /// Left or right wall
    pub horizontal: Option<WallSide>,
    /// Top or bottom wall
    pub vertical: Option<WallSide>,
}

/// Check a ball against the arena walls.
///
/// The axes are independent so a corner hit reports both. On an axis where
/// the ball pokes out of both sides at once, the low side wins.
pub fn wall_contacts(pos: Vec2, radius: f32, arena: &Arena) -> WallContacts {
    let horizontal = if pos.x - radius < 0.0 {
        Some(WallSide::Left)
    } else if pos.x + radius > arena.width {
        Some(WallSide::Right)
    } else {
        None
    };

    let vertical = if pos.y - radius < 0.0 {
        Some(WallSide::Top)
    } else if pos.y + radius > arena.height {
        Some(WallSide::Bottom)
    } else {
        None
    };

    WallContacts {
        horizontal,
        vertical,
    }
}

/// Result of a ball/obstacle overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleHit {
    pub kind: ObstacleKind,
    /// Outgoing direction (radians), away from the obstacle's hit center
    pub heading: f32,
}

/// Check a ball against one obstacle
pub fn obstacle_contact(obstacle: &Obstacle, pos: Vec2, radius: f32) -> Option<ObstacleHit> {
    match obstacle.shape {
        ObstacleShape::Rectangle { width, height } => {
            let offset = pos - obstacle.center();
            let overlaps = offset.x.abs() < width / 2.0 + radius
                && offset.y.abs() < height / 2.0 + radius;
            overlaps.then(|| ObstacleHit {
                kind: ObstacleKind::Rectangle,
                heading: heading(offset),
            })
        }
        ObstacleShape::Triangle { width, .. } => {
            let offset = pos - obstacle.anchor;
            (offset.length() < radius + width / 2.0).then(|| ObstacleHit {
                kind: ObstacleKind::Triangle,
                heading: heading(offset),
            })
        }
    }
}

/// New velocity after a bounce.
///
/// Direction is `heading` plus a uniform jitter in [-jitter, jitter]
/// (none when `jitter` is 0). Speed is uniform in [min_speed, max_speed].
pub fn randomized_bounce<R: Rng + ?Sized>(
    rng: &mut R,
    heading: f32,
    jitter: f32,
    min_speed: f32,
    max_speed: f32,
) -> Vec2 {
    let angle = if jitter > 0.0 {
        heading + rng.random_range(-jitter..=jitter)
    } else {
        heading
    };
    let speed = rng.random_range(min_speed..=max_speed);
    polar_to_cartesian(speed, angle)
}
