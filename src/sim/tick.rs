//! Per-frame simulation step
//!
//! One call to [`Simulation::step`] is one frame. There is no delta time:
//! velocities are displacements per frame.

use rand_pcg::Pcg32;

use super::collision::{obstacle_contact, randomized_bounce, wall_contacts};
use super::obstacles::{Obstacle, ObstacleKind};
use super::particles::ParticleSystem;
use super::state::{Arena, Ball, BounceEvent, BounceKind, Simulation};
use crate::config::SimConfig;

/// Input for a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Pointer X in arena coordinates, written by the host's input handler
    pub target_x: f32,
}

impl TickInput {
    pub fn new(target_x: f32) -> Self {
        Self { target_x }
    }
}

/// Everything a ball step may touch besides the ball itself
struct StepContext<'a> {
    config: &'a SimConfig,
    obstacles: &'a [Obstacle],
    particles: &'a mut ParticleSystem,
    rng: &'a mut Pcg32,
    bounces: &'a mut Vec<BounceEvent>,
}

impl StepContext<'_> {
    /// Give the ball a new random velocity and mark the contact with particles
    fn bounce(
        &mut self,
        ball: &mut Ball,
        kind: BounceKind,
        heading: f32,
        jitter: f32,
        burst: usize,
    ) {
        ball.vel = randomized_bounce(
            &mut *self.rng,
            heading,
            jitter,
            self.config.ball_min_speed,
            self.config.ball_max_speed,
        );
        self.particles.emit(&mut *self.rng, ball.pos, burst);
        self.bounces.push(BounceEvent {
            ball_id: ball.id,
            kind,
            pos: ball.pos,
        });
        log::trace!(
            "Ball {} bounced off {:?} at ({:.1}, {:.1}), new vel ({:.2}, {:.2})",
            ball.id,
            kind,
            ball.pos.x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y
        );
    }
}

impl Simulation {
    /// Advance the simulation by one frame.
    ///
    /// Every ball moves and resolves its collisions in spawn order, then
    /// particles advance and expired ones are pruned.
    pub fn step(&mut self, input: &TickInput) {
        self.bounces.clear();

        let mut ctx = StepContext {
            config: &self.config,
            obstacles: self.obstacles.as_slice(),
            particles: &mut self.particles,
            rng: &mut self.rng,
            bounces: &mut self.bounces,
        };

        for ball in &mut self.balls {
            step_ball(ball, input.target_x, &self.arena, &mut ctx);
        }

        self.particles.advance();
        self.frame += 1;

        if self.frame % 60 == 0 {
            log::debug!(
                "Frame {}: {} balls, {} obstacles, {} particles",
                self.frame,
                self.balls.len(),
                self.obstacles.len(),
                self.particles.len()
            );
        }
    }
}

/// Move one ball and resolve its collisions.
///
/// Later resolutions in the same frame overwrite earlier ones: walls first,
/// then obstacles in set order.
fn step_ball(ball: &mut Ball, target_x: f32, arena: &Arena, ctx: &mut StepContext<'_>) {
    let cfg = ctx.config;

    ball.integrate();
    ball.follow_pointer(target_x, cfg.pointer_follow);
    ball.enforce_min_speed(cfg.ball_min_speed);

    // Position is not pushed back inside; the new velocity carries it out
    let walls = wall_contacts(ball.pos, ball.radius, arena);
    for side in [walls.horizontal, walls.vertical].into_iter().flatten() {
        ctx.bounce(
            ball,
            BounceKind::Wall(side),
            side.base_angle(),
            cfg.bounce_jitter,
            cfg.wall_burst,
        );
    }

    for obstacle in ctx.obstacles {
        if let Some(hit) = obstacle_contact(obstacle, ball.pos, ball.radius) {
            let burst = match hit.kind {
                ObstacleKind::Rectangle => cfg.rect_burst,
                ObstacleKind::Triangle => cfg.triangle_burst,
            };
            ctx.bounce(ball, hit.kind.into(), hit.heading, 0.0, burst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::obstacles::ObstacleShape;
    use crate::sim::state::{Hsl, WallSide};
    use crate::{heading, normalize_angle};
    use glam::Vec2;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_3;

    const EPS: f32 = 1e-4;

    /// Simulation whose only ball starts at `pos` moving at `vel`
    fn sim_with_ball(seed: u64, pos: Vec2, vel: Vec2) -> Simulation {
        let mut sim = Simulation::new(seed);
        sim.balls[0].pos = pos;
        sim.balls[0].vel = vel;
        sim
    }

    #[test]
    fn test_left_wall_scenario() {
        let start = Vec2::new(BALL_RADIUS - 1.0, 400.0);
        let mut sim = sim_with_ball(12345, start, Vec2::new(-3.0, 0.0));

        // Pointer kept at the wall so the pull cannot drag the ball back inside
        sim.step(&TickInput::new(0.0));

        let ball = &sim.balls()[0];
        assert_eq!(
            sim.bounces().iter().map(|b| b.kind).collect::<Vec<_>>(),
            vec![BounceKind::Wall(WallSide::Left)]
        );
        assert!(normalize_angle(heading(ball.vel)).abs() <= FRAC_PI_3 + EPS);
        assert!(ball.speed() >= BALL_MIN_SPEED - EPS && ball.speed() <= BALL_MAX_SPEED + EPS);
        // Emitted this frame, then advanced once: nothing has expired yet
        assert_eq!(sim.particles().len(), 15);
    }

    #[test]
    fn test_wall_bounce_leaves_position_unclamped() {
        let mut sim = sim_with_ball(3, Vec2::new(5.0, 400.0), Vec2::new(-6.0, 0.0));
        sim.step(&TickInput::new(0.0));
        let ball = &sim.balls()[0];
        assert!(ball.pos.x < BALL_RADIUS);
        assert_eq!(sim.bounces()[0].pos, ball.pos);
    }

    #[test]
    fn test_corner_fires_both_walls() {
        let mut sim = sim_with_ball(4, Vec2::new(440.0, 790.0), Vec2::new(6.0, 6.0));
        sim.step(&TickInput::new(450.0));

        let kinds: Vec<_> = sim.bounces().iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BounceKind::Wall(WallSide::Right),
                BounceKind::Wall(WallSide::Bottom)
            ]
        );
        assert_eq!(sim.particles().len(), 30);

        // Bottom resolved last, so the velocity points up
        let ball = &sim.balls()[0];
        let off = normalize_angle(heading(ball.vel) - WallSide::Bottom.base_angle());
        assert!(off.abs() <= FRAC_PI_3 + EPS);
    }

    #[test]
    fn test_pointer_does_not_change_velocity() {
        let vel = Vec2::new(6.0, 8.0);
        let mut sim = sim_with_ball(5, Vec2::new(200.0, 400.0), vel);
        sim.step(&TickInput::new(400.0));

        let ball = &sim.balls()[0];
        assert_eq!(ball.vel, vel);
        // 200 + 6 = 206, then 5% of the way to 400
        assert!((ball.pos.x - (206.0 + 194.0 * 0.05)).abs() < EPS);
        assert!((ball.pos.y - 408.0).abs() < EPS);
        assert!(sim.bounces().is_empty());
    }

    #[test]
    fn test_slow_ball_rescaled_after_integration() {
        let mut sim = sim_with_ball(6, Vec2::new(225.0, 400.0), Vec2::new(0.0, 1.0));
        sim.step(&TickInput::new(225.0));

        let ball = &sim.balls()[0];
        // Moved by the old velocity, then rescaled
        assert!((ball.pos.y - 401.0).abs() < EPS);
        assert!((ball.vel.y - BALL_MIN_SPEED).abs() < EPS);
        assert_eq!(ball.vel.x, 0.0);
    }

    #[test]
    fn test_rectangle_inscribed_ball_heading_zero() {
        let mut sim = sim_with_ball(8, Vec2::new(150.0, 400.0), Vec2::ZERO);
        sim.obstacles.set(vec![Obstacle {
            id: 100,
            anchor: Vec2::new(100.0, 350.0),
            shape: ObstacleShape::Rectangle {
                width: 100.0,
                height: 100.0,
            },
            rotation: 2.0,
            color: Hsl::new(10.0),
        }]);

        sim.step(&TickInput::new(150.0));

        let ball = &sim.balls()[0];
        assert_eq!(sim.bounces()[0].kind, BounceKind::Rectangle);
        assert!(ball.vel.is_finite());
        assert!(ball.vel.x > 0.0);
        assert!(ball.vel.y.abs() < EPS);
        assert!(ball.speed() >= BALL_MIN_SPEED - EPS && ball.speed() <= BALL_MAX_SPEED + EPS);
        assert_eq!(sim.particles().len(), RECT_BURST);
    }

    #[test]
    fn test_triangle_bounce_emits_twenty() {
        // Ball ends the integration 40 units right of the anchor
        let mut sim = sim_with_ball(9, Vec2::new(235.0, 400.0), Vec2::new(5.0, 0.0));
        sim.obstacles.set(vec![Obstacle {
            id: 100,
            anchor: Vec2::new(200.0, 400.0),
            shape: ObstacleShape::Triangle {
                width: 60.0,
                height: 60.0,
            },
            rotation: 0.0,
            color: Hsl::new(10.0),
        }]);

        sim.step(&TickInput::new(240.0));

        let ball = &sim.balls()[0];
        assert_eq!(sim.bounces()[0].kind, BounceKind::Triangle);
        assert!(heading(ball.vel).abs() < EPS, "pushed straight away from the anchor");
        assert_eq!(sim.particles().len(), TRIANGLE_BURST);
    }

    #[test]
    fn test_last_resolution_wins() {
        // Overlaps two rectangles; the second one in set order decides
        let mut sim = sim_with_ball(10, Vec2::new(200.0, 400.0), Vec2::new(0.0, 5.0));
        let square = |x: f32, y: f32| Obstacle {
            id: 100,
            anchor: Vec2::new(x, y),
            shape: ObstacleShape::Rectangle {
                width: 40.0,
                height: 40.0,
            },
            rotation: 0.0,
            color: Hsl::new(0.0),
        };
        // Ball lands at (200, 405): left of the first box, right of the second
        sim.obstacles
            .set(vec![square(210.0, 385.0), square(150.0, 385.0)]);

        sim.step(&TickInput::new(200.0));

        assert_eq!(sim.bounces().len(), 2);
        assert_eq!(sim.particles().len(), 2 * RECT_BURST);
        assert!(sim.balls()[0].vel.x > 0.0, "second box pushes right");
    }

    #[test]
    fn test_burst_follows_obstacle_kind() {
        let config = SimConfig {
            rect_burst: 2,
            triangle_burst: 7,
            ..Default::default()
        };
        let mut sim = Simulation::with_config(12, config);
        sim.balls[0].pos = Vec2::new(200.0, 400.0);
        sim.balls[0].vel = Vec2::ZERO;
        sim.obstacles.set(vec![
            Obstacle {
                id: 100,
                anchor: Vec2::new(180.0, 380.0),
                shape: ObstacleShape::Rectangle {
                    width: 40.0,
                    height: 40.0,
                },
                rotation: 0.0,
                color: Hsl::new(0.0),
            },
            Obstacle {
                id: 101,
                anchor: Vec2::new(200.0, 420.0),
                shape: ObstacleShape::Triangle {
                    width: 60.0,
                    height: 60.0,
                },
                rotation: 0.0,
                color: Hsl::new(0.0),
            },
        ]);

        sim.step(&TickInput::new(200.0));

        assert_eq!(
            sim.bounces().iter().map(|b| b.kind).collect::<Vec<_>>(),
            vec![BounceKind::Rectangle, BounceKind::Triangle]
        );
        assert_eq!(sim.particles().len(), 9);
    }

    #[test]
    fn test_overflowed_max_speed_still_bounces() {
        let config = SimConfig::from_json(r#"{ "ball_max_speed": 1e39 }"#).unwrap();
        let mut sim = Simulation::with_config(13, config);
        sim.balls[0].pos = Vec2::new(14.0, 400.0);
        sim.balls[0].vel = Vec2::new(-5.0, 0.0);

        sim.step(&TickInput::new(0.0));

        let ball = &sim.balls()[0];
        assert_eq!(sim.bounces()[0].kind, BounceKind::Wall(WallSide::Left));
        assert!(ball.vel.is_finite());
        assert!(ball.speed() >= BALL_MIN_SPEED - EPS && ball.speed() <= BALL_MAX_SPEED + EPS);
    }

    #[test]
    fn test_each_step_is_one_frame() {
        let mut sim = sim_with_ball(14, Vec2::new(225.0, 400.0), Vec2::new(0.0, 6.0));
        for n in 1..=10 {
            sim.step(&TickInput::new(225.0));
            assert_eq!(sim.frame(), n);
            assert!((sim.balls()[0].pos.y - (400.0 + 6.0 * n as f32)).abs() < EPS);
        }
    }

    #[test]
    fn test_regenerate_then_step_uses_new_set() {
        let mut sim = Simulation::new(21);
        sim.regenerate_obstacles();
        sim.regenerate_obstacles();
        assert_eq!(sim.obstacle_generation(), 2);
        assert!((3..=7).contains(&sim.obstacles().len()));
        sim.step(&TickInput::new(225.0));
        assert_eq!(sim.frame(), 1);
    }

    #[test]
    fn test_bounces_cleared_each_step() {
        let mut sim = sim_with_ball(11, Vec2::new(14.0, 400.0), Vec2::new(-5.0, 0.0));
        sim.step(&TickInput::new(0.0));
        assert!(!sim.bounces().is_empty());

        sim.balls[0].pos = Vec2::new(225.0, 400.0);
        sim.balls[0].vel = Vec2::new(0.0, 5.0);
        sim.step(&TickInput::new(225.0));
        assert!(sim.bounces().is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed should produce identical results
        let mut sim1 = Simulation::new(99999);
        let mut sim2 = Simulation::new(99999);

        for sim in [&mut sim1, &mut sim2] {
            sim.regenerate_obstacles();
            sim.spawn_ball();
            for frame in 0..600 {
                let target = 225.0 + (frame as f32 * 0.05).sin() * 150.0;
                sim.step(&TickInput::new(target));
            }
        }

        assert_eq!(sim1.frame(), sim2.frame());
        assert_eq!(sim1.balls(), sim2.balls());
        assert_eq!(sim1.particles().as_slice(), sim2.particles().as_slice());
    }

    proptest! {
        #[test]
        fn prop_speed_at_least_min_after_step(
            seed in any::<u64>(),
            x in 0.0f32..450.0,
            y in 0.0f32..800.0,
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            target in -100.0f32..550.0,
        ) {
            let mut sim = sim_with_ball(seed, Vec2::new(x, y), Vec2::new(vx, vy));
            sim.regenerate_obstacles();
            for _ in 0..5 {
                sim.step(&TickInput::new(target));
                for ball in sim.balls() {
                    prop_assert!(ball.vel.is_finite());
                    prop_assert!(ball.speed() >= BALL_MIN_SPEED - EPS);
                }
            }
        }

        #[test]
        fn prop_bounce_speed_in_range(seed in any::<u64>(), frames in 1usize..200) {
            let mut sim = Simulation::new(seed);
            sim.regenerate_obstacles();
            sim.spawn_ball();
            for _ in 0..frames {
                sim.step(&TickInput::new(225.0));
                if !sim.bounces().is_empty() {
                    for ball in sim.balls() {
                        let bounced = sim.bounces().iter().any(|b| b.ball_id == ball.id);
                        if bounced {
                            prop_assert!(ball.speed() >= BALL_MIN_SPEED - EPS);
                            prop_assert!(ball.speed() <= BALL_MAX_SPEED + EPS);
                        }
                    }
                }
            }
        }
    }
}
