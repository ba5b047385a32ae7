//! Bomba - an artillery target game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, session state)
//! - `platform`: Renderer/display collaborator traits and the frame driver
//! - `settings`: Data-driven game tuning
//! - `highscores`: In-memory leaderboard

pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{ConfigError, EffectsQuality, GameConfig, RehitPolicy, WindModel};

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate (one tick per animation frame)
    pub const TICK_RATE_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Drawn radius of every projectile
    pub const PROJECTILE_RADIUS: f32 = 8.0;
    /// Enemy projectiles are smaller than the player's shell
    pub const ENEMY_PROJECTILE_RADIUS: f32 = 5.0;
    /// Distance from the cannon at which an enemy projectile counts as a hit
    pub const CANNON_HIT_RADIUS: f32 = 20.0;

    /// Upward drift of floating score text (pixels per tick)
    pub const FLOATING_TEXT_SPEED: f32 = 1.0;
    /// Gravity scale applied to explosion sparks
    pub const SPARK_GRAVITY_SCALE: f32 = 0.1;

    /// Bursts per firework show and sparks per burst
    pub const FIREWORK_BURSTS: u32 = 5;
    pub const FIREWORK_SPARKS: u32 = 30;

    /// Sparks thrown by an impact on the building or an obstacle
    pub const IMPACT_SPARKS: u32 = 30;
    /// Sparks thrown by a projectile leaving the playfield
    pub const MISS_SPARKS: u32 = 20;

    /// Steps in the trajectory guide shown while aiming
    pub const TRAJECTORY_STEPS: usize = 50;
}

/// Convert slider degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * (std::f32::consts::PI / 180.0)
}

/// Unit vector for a screen-space angle (y grows downward, so "up" is -y)
#[inline]
pub fn screen_direction(angle_rad: f32) -> glam::Vec2 {
    glam::Vec2::new(angle_rad.cos(), -angle_rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_to_rad() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!(deg_to_rad(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_direction_points_up() {
        let up = screen_direction(deg_to_rad(90.0));
        assert!(up.x.abs() < 1e-6);
        assert!((up.y + 1.0).abs() < 1e-6);
    }
}
