//! Particle system: sparks, trails, floating score text and sub-projectiles
//!
//! Everything here is decoration except sub-projectiles, the companions fired
//! by multi-shot. Those fly like the primary shell, resolve against the hotel
//! each tick and report target impacts back to the session, which awards the
//! bonus.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::building::Building;
use super::collision::{Outcome, resolve};
use super::physics::Forces;
use super::state::Target;
use crate::consts::{FIREWORK_SPARKS, FLOATING_TEXT_SPEED, SPARK_GRAVITY_SCALE};
use crate::settings::RehitPolicy;

pub type ParticleId = u32;

/// Packed RGBA colors
pub mod colors {
    pub const IMPACT: u32 = 0xFF64_64B3;
    pub const TRAIL: u32 = 0xC8C8_C899;
    pub const SCORE_TEXT: u32 = 0xFFD7_00FF;
    pub const BONUS_TEXT: u32 = 0x00FF_7FFF;
    pub const SUB_PROJECTILE: u32 = 0xFF8C_00FF;
    pub const ENEMY_IMPACT: u32 = 0xFFFF_00CC;
    pub const FIREWORKS: [u32; 6] = [
        0xFF00_00FF,
        0x00FF_00FF,
        0x0000_FFFF,
        0xFFFF_00FF,
        0xFF00_FFFF,
        0x00FF_FFFF,
    ];
}

/// Particle variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    Trail,
    FloatingText { label: String },
    SubProjectile,
}

/// A live particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub size: f32,
    /// Ticks left; removed once it reaches zero
    pub life: i32,
    /// Fraction of world gravity applied each tick (0 = none)
    pub gravity_scale: f32,
}

/// Look and lifetime of a spawned particle
#[derive(Debug, Clone, Copy)]
pub struct SpawnParams {
    pub color: u32,
    pub size: f32,
    pub life: i32,
    pub gravity_scale: f32,
}

/// What the particle tick needs to know about the world
#[derive(Debug, Clone, Copy)]
pub struct ParticleWorld<'a> {
    pub building: &'a Building,
    pub target: &'a Target,
    /// Playfield size; sub-projectiles leaving it are dropped
    pub bounds: Vec2,
    /// The primary shell's forces. Sub-projectiles fly under all of them,
    /// decoration only under scaled gravity.
    pub forces: Forces,
    pub policy: RehitPolicy,
}

/// A sub-projectile that landed on the target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubProjectileImpact {
    pub particle: ParticleId,
    pub pos: Vec2,
    pub room: usize,
}

/// Owner of every live particle
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    next_id: ParticleId,
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            next_id: 1,
            max_particles,
        }
    }

    /// Add a particle. Decorative particles over the cap are dropped;
    /// sub-projectiles always get in because they can score.
    pub fn spawn(
        &mut self,
        kind: ParticleKind,
        origin: Vec2,
        vel: Vec2,
        params: SpawnParams,
    ) -> Option<ParticleId> {
        if params.life <= 0 {
            return None;
        }
        if kind != ParticleKind::SubProjectile && self.particles.len() >= self.max_particles {
            return None;
        }
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.particles.push(Particle {
            id,
            kind,
            pos: origin,
            vel,
            color: params.color,
            size: params.size,
            life: params.life,
            gravity_scale: params.gravity_scale,
        });
        Some(id)
    }

    /// Explosion sparks flying out in random directions
    pub fn burst<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: Vec2, count: u32, color: u32) {
        for _ in 0..count {
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 5.0,
                (rng.random::<f32>() - 0.5) * 5.0,
            );
            let params = SpawnParams {
                color,
                size: rng.random_range(3.0..6.0),
                life: rng.random_range(30..50),
                gravity_scale: SPARK_GRAVITY_SCALE,
            };
            self.spawn(ParticleKind::Spark, origin, vel, params);
        }
    }

    /// A ring of sparks in one random palette color
    pub fn firework<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: Vec2) {
        let color = colors::FIREWORKS[rng.random_range(0..colors::FIREWORKS.len())];
        for i in 0..FIREWORK_SPARKS {
            let angle = std::f32::consts::TAU * i as f32 / FIREWORK_SPARKS as f32;
            let speed = rng.random_range(3.0..5.0);
            let params = SpawnParams {
                color,
                size: rng.random_range(2.0..4.0),
                life: rng.random_range(40..60),
                gravity_scale: SPARK_GRAVITY_SCALE,
            };
            self.spawn(
                ParticleKind::Spark,
                origin,
                Vec2::new(angle.cos(), angle.sin()) * speed,
                params,
            );
        }
    }

    /// A motionless puff left behind a flying shell
    pub fn trail(&mut self, origin: Vec2) -> Option<ParticleId> {
        self.spawn(
            ParticleKind::Trail,
            origin,
            Vec2::ZERO,
            SpawnParams {
                color: colors::TRAIL,
                size: 3.0,
                life: 20,
                gravity_scale: 0.0,
            },
        )
    }

    /// Text rising straight up, e.g. "+200"
    pub fn floating_text(&mut self, origin: Vec2, label: String, color: u32) -> Option<ParticleId> {
        self.spawn(
            ParticleKind::FloatingText { label },
            origin,
            Vec2::new(0.0, -FLOATING_TEXT_SPEED),
            SpawnParams {
                color,
                size: 16.0,
                life: 60,
                gravity_scale: 0.0,
            },
        )
    }

    /// A multi-shot companion shell under full gravity
    pub fn sub_projectile(&mut self, origin: Vec2, vel: Vec2, life: i32) -> Option<ParticleId> {
        self.spawn(
            ParticleKind::SubProjectile,
            origin,
            vel,
            SpawnParams {
                color: colors::SUB_PROJECTILE,
                size: 5.0,
                life,
                gravity_scale: 1.0,
            },
        )
    }

    /// Advance every particle one tick and drop the finished ones.
    ///
    /// Sub-projectiles resolve against the hotel like the primary shell:
    /// damaged rooms and the target's empty window are open air, an intact
    /// room stops them, and the visible target is reported as an impact.
    /// They never damage a room.
    pub fn tick(&mut self, world: &ParticleWorld<'_>) -> Vec<SubProjectileImpact> {
        let mut impacts = Vec::new();
        let forces = &world.forces;

        self.particles.retain_mut(|p| {
            match p.kind {
                ParticleKind::SubProjectile => {
                    let f = forces.time_scale;
                    p.vel += Vec2::new(forces.wind, forces.gravity * p.gravity_scale) * f;
                    p.pos += p.vel * f;
                }
                // Text only drifts upward
                ParticleKind::FloatingText { .. } => p.pos += p.vel,
                _ => {
                    p.pos += p.vel;
                    p.vel.y += forces.gravity * p.gravity_scale;
                }
            }
            p.life -= 1;
            if p.life <= 0 {
                return false;
            }

            if p.kind == ParticleKind::SubProjectile {
                if p.pos.x < 0.0 || p.pos.x > world.bounds.x || p.pos.y > world.bounds.y {
                    return false;
                }
                match resolve(p.pos, world.building, world.target, world.policy) {
                    Outcome::Hit { room } => {
                        impacts.push(SubProjectileImpact {
                            particle: p.id,
                            pos: p.pos,
                            room,
                        });
                        return false;
                    }
                    Outcome::None => {}
                    _ => return false,
                }
            }
            true
        });

        impacts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn count_kind(&self, pred: impl Fn(&ParticleKind) -> bool) -> usize {
        self.particles.iter().filter(|p| pred(&p.kind)).count()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }
}
