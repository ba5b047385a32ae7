//! Read-only view of a session for the renderer

use glam::Vec2;
use serde::Serialize;

use super::building::Rect;
use super::modulators::wind_arrows;
use super::particles::Particle;
use super::physics::{Forces, Projectile, launch_velocity, predict_path};
use super::state::{ActivePowerup, AttemptsTone, GamePhase, Powerup, Session, TargetBehavior};
use crate::consts::TRAJECTORY_STEPS;
use crate::{deg_to_rad, screen_direction};

/// Hotel layout plus damage, for drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingView {
    pub bounds: Rect,
    pub floors: u32,
    pub columns: u32,
    pub damaged: Vec<bool>,
    pub target_room: usize,
    /// Target hit-box after the moving offset
    pub target_rect: Rect,
    pub target_offset: f32,
    pub target_visible: bool,
    pub target_behavior: TargetBehavior,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub cannon: Vec2,
    pub cannon_angle_degrees: f32,
    /// Unit vector along the barrel, screen space
    pub barrel: Vec2,
    pub projectile: Option<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub building: BuildingView,
    pub obstacles: Vec<Rect>,
    pub particles: Vec<Particle>,
    pub powerups: Vec<Powerup>,
    pub active_powerup: Option<ActivePowerup>,
    pub wind: f32,
    pub wind_arrows: String,
    pub score: u64,
    pub level: u32,
    pub attempts: u32,
    pub attempts_tone: AttemptsTone,
    pub combo: u32,
    /// Predicted path while aiming; empty otherwise
    pub trajectory: Vec<Vec2>,
}

impl Session {
    pub fn snapshot(&self) -> RenderSnapshot {
        let trajectory = if self.can_fire() {
            let forces = Forces {
                gravity: self.config.gravity,
                wind: self.wind,
                time_scale: super::modulators::time_scale(self),
            };
            let vel = launch_velocity(self.aim.angle_degrees, self.aim.power_raw, &self.config);
            predict_path(
                self.config.cannon_position,
                vel,
                &forces,
                TRAJECTORY_STEPS,
                self.config.playfield,
            )
        } else {
            Vec::new()
        };

        RenderSnapshot {
            tick: self.time_ticks,
            phase: self.phase,
            cannon: self.config.cannon_position,
            cannon_angle_degrees: self.aim.angle_degrees,
            barrel: screen_direction(deg_to_rad(self.aim.angle_degrees)),
            projectile: self.projectile,
            enemy_projectiles: self.enemy_projectiles.clone(),
            building: BuildingView {
                bounds: self.building.bounds(),
                floors: self.building.floors,
                columns: self.building.columns,
                damaged: self.building.damage_map().to_vec(),
                target_room: self.target.room,
                target_rect: self.target.hitbox(&self.building),
                target_offset: self.target.offset,
                target_visible: self.target.visible,
                target_behavior: self.target.behavior,
            },
            obstacles: self.obstacle_rects(),
            particles: self.particles.as_slice().to_vec(),
            powerups: self.powerups.clone(),
            active_powerup: self.active_powerup,
            wind: self.wind,
            wind_arrows: wind_arrows(self.wind),
            score: self.score,
            level: self.level,
            attempts: self.attempts,
            attempts_tone: self.attempts_tone(),
            combo: self.combo.count,
            trajectory,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::GameConfig;
    use crate::sim::state::Session;
    use crate::sim::tick::{TickInput, tick};

    #[test]
    fn test_trajectory_only_while_aiming() {
        let mut session = Session::new(GameConfig::classic(), 1);
        let snap = session.snapshot();
        assert!(!snap.trajectory.is_empty());
        assert_eq!(snap.trajectory[0], snap.cannon);
        assert_eq!(snap.building.damaged.len(), 20);
        assert_eq!(snap.wind_arrows, "");

        tick(
            &mut session,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        let snap = session.snapshot();
        assert!(snap.trajectory.is_empty());
        assert!(snap.projectile.is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = Session::new(GameConfig::default(), 1);
        let json = serde_json::to_string(&session.snapshot()).expect("serializable");
        assert!(json.contains("\"level\":1"));
    }
}
