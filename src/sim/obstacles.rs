//! Static obstacles
//!
//! Obstacles never move. The whole set is thrown away and rebuilt on each
//! regeneration.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Arena, Hsl};
use crate::config::SimConfig;

/// Obstacle geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObstacleShape {
    /// Hit test is axis-aligned; rotation is only drawn
    Rectangle { width: f32, height: f32 },
    /// Hit test is a circle of diameter `width` around the anchor
    Triangle { width: f32, height: f32 },
}

/// Which collision rule an obstacle uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rectangle,
    Triangle,
}

impl ObstacleShape {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            ObstacleShape::Rectangle { .. } => ObstacleKind::Rectangle,
            ObstacleShape::Triangle { .. } => ObstacleKind::Triangle,
        }
    }

    /// Bounding size (width, height)
    pub fn size(&self) -> Vec2 {
        match *self {
            ObstacleShape::Rectangle { width, height }
            | ObstacleShape::Triangle { width, height } => Vec2::new(width, height),
        }
    }
}

/// A static obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner of the bounding box
    pub anchor: Vec2,
    pub shape: ObstacleShape,
    /// Render rotation around [`Obstacle::center`] (radians)
    pub rotation: f32,
    pub color: Hsl,
}

impl Obstacle {
    /// Center of the bounding box (render origin, rectangle hit center)
    pub fn center(&self) -> Vec2 {
        self.anchor + self.shape.size() / 2.0
    }
}

/// The current obstacle set
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    generation: u32,
}

impl ObstacleField {
    /// Discard every obstacle and generate a fresh batch.
    ///
    /// The batch is built completely before it replaces the old set. Ids are
    /// taken from `next_id`, which is left pointing past the last one used.
    pub fn regenerate<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        arena: &Arena,
        config: &SimConfig,
        next_id: &mut u32,
    ) {
        let count = rng.random_range(config.obstacle_min_count..=config.obstacle_max_count);
        let margin = config.obstacle_margin;
        let sizes = config.obstacle_min_size..=config.obstacle_max_size;

        let batch: Vec<Obstacle> = (0..count)
            .map(|_| {
                let rectangle = rng.random_bool(0.5);
                let anchor = Vec2::new(
                    rng.random_range(margin..=arena.width - margin),
                    rng.random_range(margin..=arena.height - margin),
                );
                let width = rng.random_range(sizes.clone());
                let height = rng.random_range(sizes.clone());
                let shape = if rectangle {
                    ObstacleShape::Rectangle { width, height }
                } else {
                    ObstacleShape::Triangle { width, height }
                };
                let id = *next_id;
                *next_id += 1;
                Obstacle {
                    id,
                    anchor,
                    shape,
                    rotation: rng.random_range(0.0..TAU),
                    color: Hsl::random(rng),
                }
            })
            .collect();

        self.obstacles = batch;
        self.generation = self.generation.wrapping_add(1);
        log::info!(
            "Generated {} obstacles (generation {})",
            self.obstacles.len(),
            self.generation
        );
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Number of regenerations so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Replace the set with hand-placed obstacles
    pub fn set(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
        self.generation = self.generation.wrapping_add(1);
    }
}
