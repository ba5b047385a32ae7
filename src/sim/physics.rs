//! Projectile integration under gravity and wind
//!
//! Units are pixels and ticks. Screen space: origin top-left, y grows down,
//! so gravity is a positive y acceleration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::building::{Building, Rect};
use super::state::Aim;
use crate::consts::PROJECTILE_RADIUS;
use crate::settings::GameConfig;
use crate::{deg_to_rad, screen_direction};

/// A shell in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            radius: PROJECTILE_RADIUS,
        }
    }
}

/// Forces acting on a projectile for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forces {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Horizontal acceleration per tick
    pub wind: f32,
    /// Delta multiplier (slow-time runs at 0.5)
    pub time_scale: f32,
}

impl Forces {
    pub fn calm(gravity: f32) -> Self {
        Self {
            gravity,
            wind: 0.0,
            time_scale: 1.0,
        }
    }
}

/// One integration step: velocity first, then position.
///
/// The time scale shrinks both deltas for this tick only; a later tick at
/// full speed moves with the velocity accumulated so far.
#[inline]
pub fn advance(p: &mut Projectile, forces: &Forces) {
    let f = forces.time_scale;
    p.vel += Vec2::new(forces.wind, forces.gravity) * f;
    p.pos += p.vel * f;
}

/// Left, right or below the playfield. Above the top is still in play.
#[inline]
pub fn out_of_bounds(pos: Vec2, playfield: Vec2) -> bool {
    pos.x < 0.0 || pos.x > playfield.x || pos.y > playfield.y
}

/// Muzzle velocity for slider values
pub fn launch_velocity(angle_degrees: f32, power_raw: f32, config: &GameConfig) -> Vec2 {
    let speed = power_raw / config.power_divisor * config.launch_scale;
    screen_direction(deg_to_rad(angle_degrees)) * speed
}

/// Velocity that carries a shell from `from` to `to` in whole ticks, moving
/// about `speed` pixels per tick horizontally, under gravity and no wind.
pub fn lob_velocity(from: Vec2, to: Vec2, speed: f32, gravity: f32) -> Vec2 {
    let d = to - from;
    let n = (d.x.abs() / speed.max(f32::EPSILON)).ceil().max(1.0);
    Vec2::new(d.x / n, (d.y - gravity * n * (n + 1.0) * 0.5) / n)
}

/// Trajectory guide: up to `steps` future positions, stopping once the path
/// leaves the right or bottom edge.
pub fn predict_path(
    origin: Vec2,
    vel: Vec2,
    forces: &Forces,
    steps: usize,
    playfield: Vec2,
) -> Vec<Vec2> {
    let mut shell = Projectile::new(origin, vel);
    let mut path = Vec::with_capacity(steps + 1);
    path.push(origin);
    for _ in 0..steps {
        advance(&mut shell, forces);
        if shell.pos.x > playfield.x || shell.pos.y > playfield.y {
            break;
        }
        path.push(shell.pos);
    }
    path
}

/// Where a shot first lands, given the current hotel and obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Room(usize),
    Obstacle,
    Offscreen,
}

/// Fly a shot to its first contact without touching any session state.
/// Damaged rooms are skipped the way the resolver skips them.
pub fn simulate_landing(
    origin: Vec2,
    vel: Vec2,
    forces: &Forces,
    building: &Building,
    obstacles: &[Rect],
    playfield: Vec2,
    max_ticks: u32,
) -> Landing {
    let mut shell = Projectile::new(origin, vel);
    for _ in 0..max_ticks {
        advance(&mut shell, forces);
        if let Some(room) = building.room_at(shell.pos) {
            if !building.is_damaged(room) {
                return Landing::Room(room);
            }
        }
        if obstacles.iter().any(|o| o.contains(shell.pos)) {
            return Landing::Obstacle;
        }
        if out_of_bounds(shell.pos, playfield) {
            return Landing::Offscreen;
        }
    }
    Landing::Offscreen
}

/// Brute-force search for slider values that land in `target_room`.
///
/// Sweeps angles from 45 degrees outward and power upward, returning the
/// first hit. Used by the autopilot.
pub fn solve_aim(
    config: &GameConfig,
    forces: &Forces,
    building: &Building,
    obstacles: &[Rect],
    target_room: usize,
) -> Option<Aim> {
    let origin = config.cannon_position;
    let max_power = config.max_power_raw.max(1.0) as u32;
    // 45, 44, 46, 43, 47, ... out to 5 and 85
    let angles = (0..=80u32).map(|i| {
        if i % 2 == 0 {
            45.0 + (i / 2) as f32
        } else {
            45.0 - i.div_ceil(2) as f32
        }
    });

    for angle in angles {
        for power in 1..=max_power {
            let power = power as f32;
            let vel = launch_velocity(angle, power, config);
            let landing = simulate_landing(
                origin,
                vel,
                forces,
                building,
                obstacles,
                config.playfield,
                2_000,
            );
            if landing == Landing::Room(target_room) {
                return Some(Aim {
                    angle_degrees: angle,
                    power_raw: power,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_velocity_at_45_degrees() {
        let config = GameConfig::default();
        let vel = launch_velocity(45.0, 50.0, &config);
        // Raw 50 over divisor 5 gives speed 10
        assert!((vel.length() - 10.0).abs() < 1e-4);
        assert!((vel.x + vel.y).abs() < 1e-4, "vx == -vy (up is negative y)");
        assert!(vel.y < 0.0);
    }

    #[test]
    fn test_symmetric_parabola_returns_to_launch_height() {
        let config = GameConfig::default();
        let start = Vec2::new(50.0, 450.0);
        let vel = launch_velocity(45.0, 50.0, &config);
        let vy = -vel.y;
        let forces = Forces::calm(0.5);
        let mut shell = Projectile::new(start, vel);

        let mut ticks = 0u32;
        loop {
            advance(&mut shell, &forces);
            ticks += 1;
            if shell.vel.y > 0.0 && shell.pos.y >= start.y {
                break;
            }
            assert!(ticks < 1000);
        }
        let expected = 2.0 * vy / forces.gravity;
        assert!((ticks as f32 - expected).abs() <= 1.5, "{ticks} vs {expected}");
        // Horizontal speed never changed without wind
        assert!((shell.vel.x - vel.x).abs() < 1e-5);
    }

    #[test]
    fn test_wind_accumulates_horizontally() {
        let mut shell = Projectile::new(Vec2::ZERO, Vec2::ZERO);
        let forces = Forces {
            gravity: 0.0,
            wind: 0.2,
            time_scale: 1.0,
        };
        for _ in 0..5 {
            advance(&mut shell, &forces);
        }
        assert!((shell.vel.x - 1.0).abs() < 1e-5);
        assert!((shell.pos.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_slow_time_halves_displacement() {
        let mut fast = Projectile::new(Vec2::ZERO, Vec2::new(4.0, 0.0));
        let mut slow = fast;
        advance(&mut fast, &Forces::calm(0.5));
        advance(
            &mut slow,
            &Forces {
                time_scale: 0.5,
                ..Forces::calm(0.5)
            },
        );
        assert!((fast.pos.x - 4.0).abs() < 1e-6);
        assert!((slow.pos.x - 2.0).abs() < 1e-6);
        assert!((slow.vel.y - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_lob_velocity_reaches_the_mark() {
        let from = Vec2::new(600.0, 300.0);
        let to = Vec2::new(50.0, 450.0);
        let vel = lob_velocity(from, to, 8.0, 0.5);
        assert!((vel.x + 8.0).abs() < 0.2);

        let mut shell = Projectile::new(from, vel);
        let ticks = (550.0f32 / 8.0).ceil() as u32;
        for _ in 0..ticks {
            advance(&mut shell, &Forces::calm(0.5));
        }
        assert!(shell.pos.distance(to) < 0.5, "{:?}", shell.pos);
    }

    #[test]
    fn test_out_of_bounds_edges() {
        let field = Vec2::new(800.0, 600.0);
        assert!(out_of_bounds(Vec2::new(-0.1, 10.0), field));
        assert!(out_of_bounds(Vec2::new(800.1, 10.0), field));
        assert!(out_of_bounds(Vec2::new(10.0, 600.1), field));
        assert!(!out_of_bounds(Vec2::new(10.0, -500.0), field));
    }

    #[test]
    fn test_predict_path_stops_at_edge() {
        let path = predict_path(
            Vec2::new(50.0, 450.0),
            Vec2::new(20.0, -5.0),
            &Forces::calm(0.5),
            50,
            Vec2::new(800.0, 600.0),
        );
        assert_eq!(path[0], Vec2::new(50.0, 450.0));
        assert!(path.len() < 51);
        assert!(path.iter().all(|p| p.x <= 800.0 && p.y <= 600.0));
    }

    #[test]
    fn test_solve_aim_finds_target_room() {
        let config = GameConfig::classic();
        let building = Building::for_level(&config, 1);
        let forces = Forces::calm(config.gravity);
        // Room 5 is the second floor of the street-facing column
        let aim = solve_aim(&config, &forces, &building, &[], 5).expect("room 5 reachable");
        let landing = simulate_landing(
            config.cannon_position,
            launch_velocity(aim.angle_degrees, aim.power_raw, &config),
            &forces,
            &building,
            &[],
            config.playfield,
            2_000,
        );
        assert_eq!(landing, Landing::Room(5));
    }

    #[test]
    fn test_interior_room_needs_an_opening() {
        let config = GameConfig::classic();
        let mut building = Building::for_level(&config, 1);
        let forces = Forces::calm(config.gravity);
        // Room 6 sits behind room 5; the shell has to come through the wall
        assert!(solve_aim(&config, &forces, &building, &[], 6).is_none());
        building.mark_damaged(5);
        assert!(solve_aim(&config, &forces, &building, &[], 6).is_some());
    }
}
