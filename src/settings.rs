//! Game configuration and tuning
//!
//! Every rule that differed between the game's historical variants is a field
//! here, so one session type covers all of them. Loaded from JSON; any field
//! left out falls back to its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Visual effects preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectsQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl EffectsQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectsQuality::Low => "Low",
            EffectsQuality::Medium => "Medium",
            EffectsQuality::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(EffectsQuality::Low),
            "medium" | "med" => Some(EffectsQuality::Medium),
            "high" => Some(EffectsQuality::High),
            _ => None,
        }
    }

    /// Cap on live decorative particles
    pub fn max_particles(&self) -> usize {
        match self {
            EffectsQuality::Low => 128,
            EffectsQuality::Medium => 512,
            EffectsQuality::High => 2048,
        }
    }
}

/// How wind is rolled at the start of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindModel {
    /// Deterministic oscillation over session time
    #[default]
    Sinusoidal,
    /// Fresh random draw per level
    Random,
}

/// What happens when a shot lands in a room that is already damaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RehitPolicy {
    /// Damaged rooms, the target included, let the shot pass through
    BlockTarget,
    /// Damaged non-target rooms pass through; the target always scores
    #[default]
    AllowRehit,
}

/// Hotel geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub width: f32,
    pub height: f32,
    pub floors: u32,
    pub columns: u32,
    /// Gap between the hotel's right wall and the playfield edge
    pub right_margin: f32,
    /// Gap between the hotel's base and the playfield bottom
    pub ground_margin: f32,
    /// First level at which the hotel shrinks (with level scaling on)
    pub shrink_level: u32,
    pub shrink_factor: f32,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 400.0,
            floors: 4,
            columns: 5,
            right_margin: 50.0,
            ground_margin: 20.0,
            shrink_level: 4,
            shrink_factor: 0.7,
        }
    }
}

/// Wind tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Levels below this are calm
    pub start_level: u32,
    /// Amplitude added per level
    pub step: f32,
    /// Amplitude ceiling
    pub cap: f32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            start_level: 2,
            step: 0.1,
            cap: 0.4,
        }
    }
}

/// Delays for deferred transitions, in ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Victory message time before the next level starts
    pub hit_delay_ticks: u64,
    /// Pause after a miss before the cannon can fire again
    pub miss_delay_ticks: u64,
    /// Combo lapses if no hit lands within this window
    pub combo_window_ticks: u32,
    /// Spacing between firework bursts
    pub firework_interval_ticks: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hit_delay_ticks: 120,
            miss_delay_ticks: 45,
            combo_window_ticks: 1800,
            firework_interval_ticks: 12,
        }
    }
}

/// Obstacles between the cannon and the hotel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub static_level: u32,
    pub static_position: Vec2,
    pub static_size: Vec2,
    pub moving_level: u32,
    pub moving_position: Vec2,
    pub moving_size: Vec2,
    /// Vertical speed of the moving obstacle (pixels per tick)
    pub moving_speed: f32,
    /// The moving obstacle bounces this far from the top and bottom edges
    pub moving_margin: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            static_level: 5,
            static_position: Vec2::new(400.0, 200.0),
            static_size: Vec2::new(40.0, 150.0),
            moving_level: 6,
            moving_position: Vec2::new(350.0, 200.0),
            moving_size: Vec2::new(50.0, 50.0),
            moving_speed: 2.0,
            moving_margin: 100.0,
        }
    }
}

/// Target behaviors (moving, hiding, shooting)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub enabled: bool,
    pub moving_level: u32,
    pub hiding_level: u32,
    pub shooting_level: u32,
    /// Horizontal sway of a moving target (pixels)
    pub move_amplitude: f32,
    /// Sway frequency (radians per second)
    pub move_frequency: f32,
    /// A hiding target toggles visibility this often
    pub hide_interval_ticks: u64,
    /// Ticks between enemy shots before the target may fire again
    pub shoot_cooldown_ticks: u32,
    /// Chance per tick to fire once the cooldown has elapsed
    pub shoot_probability: f64,
    /// Horizontal speed of enemy shells (pixels per tick)
    pub enemy_speed: f32,
    /// Enemy shells aim within this many pixels either side of the cannon
    pub enemy_spread: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            moving_level: 3,
            hiding_level: 5,
            shooting_level: 7,
            move_amplitude: 30.0,
            move_frequency: 1.5,
            hide_interval_ticks: 90,
            shoot_cooldown_ticks: 180,
            shoot_probability: 0.01,
            enemy_speed: 8.0,
            enemy_spread: 40.0,
        }
    }
}

/// Collectible powerups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupConfig {
    pub enabled: bool,
    pub start_level: u32,
    pub spawn_interval_ticks: u32,
    pub max_concurrent: usize,
    pub radius: f32,
    /// How long a collected effect stays active
    pub effect_ticks: u32,
    /// Powerups appear inside this rectangle (min corner, max corner)
    pub spawn_min: Vec2,
    pub spawn_max: Vec2,
    /// Physics delta multiplier while slow-time is active
    pub slow_factor: f32,
    /// Angle between the primary shot and each multi-shot companion
    pub multishot_spread_degrees: f32,
    /// Score for a multi-shot companion landing on the target
    pub sub_projectile_bonus: u64,
    /// Sub-projectiles are removed after this many ticks regardless
    pub sub_projectile_lifetime: i32,
}

impl Default for PowerupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start_level: 2,
            spawn_interval_ticks: 600,
            max_concurrent: 2,
            radius: 15.0,
            effect_ticks: 900,
            spawn_min: Vec2::new(150.0, 100.0),
            spawn_max: Vec2::new(400.0, 350.0),
            slow_factor: 0.5,
            multishot_spread_degrees: 10.0,
            sub_projectile_bonus: 50,
            sub_projectile_lifetime: 600,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield size in pixels (origin top-left, y down)
    pub playfield: Vec2,
    pub cannon_position: Vec2,
    /// Downward acceleration (pixels per tick squared)
    pub gravity: f32,
    /// Raw power slider value is divided by this
    pub power_divisor: f32,
    /// Scale from divided power to launch speed
    pub launch_scale: f32,
    pub max_power_raw: f32,
    pub initial_attempts: u32,
    /// Score for a hit on level 1; later levels multiply it
    pub base_points: u64,
    /// Chance per tick that a flying shell leaves a trail puff
    pub trail_probability: f64,
    /// Shrink the hotel on later levels
    pub level_scaling: bool,
    pub wind_model: WindModel,
    pub rehit_policy: RehitPolicy,
    pub quality: EffectsQuality,
    pub building: BuildingConfig,
    pub wind: WindConfig,
    pub timing: TimingConfig,
    pub obstacles: ObstacleConfig,
    pub behaviors: BehaviorConfig,
    pub powerups: PowerupConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            playfield: Vec2::new(800.0, 600.0),
            cannon_position: Vec2::new(50.0, 450.0),
            gravity: 0.5,
            power_divisor: 5.0,
            launch_scale: 1.0,
            max_power_raw: 100.0,
            initial_attempts: 5,
            base_points: 100,
            trail_probability: 0.3,
            level_scaling: true,
            wind_model: WindModel::default(),
            rehit_policy: RehitPolicy::default(),
            quality: EffectsQuality::default(),
            building: BuildingConfig::default(),
            wind: WindConfig::default(),
            timing: TimingConfig::default(),
            obstacles: ObstacleConfig::default(),
            behaviors: BehaviorConfig::default(),
            powerups: PowerupConfig::default(),
        }
    }
}

impl GameConfig {
    /// Plain rules: no behaviors, no powerups, no obstacles, no wind.
    pub fn classic() -> Self {
        let mut config = Self::default();
        config.behaviors.enabled = false;
        config.powerups.enabled = false;
        config.obstacles.static_level = u32::MAX;
        config.obstacles.moving_level = u32::MAX;
        config.wind.start_level = u32::MAX;
        config
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playfield.x <= 0.0 || self.playfield.y <= 0.0 {
            return Err(ConfigError::invalid("playfield", "must be positive"));
        }
        if !(self.gravity > 0.0) {
            return Err(ConfigError::invalid("gravity", "must be positive"));
        }
        if self.power_divisor <= 0.0 {
            return Err(ConfigError::invalid("power_divisor", "must be positive"));
        }
        if self.initial_attempts == 0 {
            return Err(ConfigError::invalid("initial_attempts", "must be at least 1"));
        }
        if self.building.floors == 0 || self.building.columns == 0 {
            return Err(ConfigError::invalid("building", "needs at least one room"));
        }
        if self.building.width <= 0.0 || self.building.height <= 0.0 {
            return Err(ConfigError::invalid("building", "size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.trail_probability) {
            return Err(ConfigError::invalid("trail_probability", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.behaviors.shoot_probability) {
            return Err(ConfigError::invalid(
                "behaviors.shoot_probability",
                "must be within 0..=1",
            ));
        }
        if self.behaviors.enemy_speed <= 0.0 {
            return Err(ConfigError::invalid("behaviors.enemy_speed", "must be positive"));
        }
        if self.powerups.spawn_min.cmpgt(self.powerups.spawn_max).any() {
            return Err(ConfigError::invalid(
                "powerups.spawn_min",
                "must not exceed spawn_max",
            ));
        }
        if self.powerups.slow_factor <= 0.0 || self.powerups.slow_factor > 1.0 {
            return Err(ConfigError::invalid("powerups.slow_factor", "must be within (0, 1]"));
        }
        let room_width = self.building.width / self.building.columns as f32;
        if self.behaviors.move_amplitude >= room_width {
            log::warn!(
                "move_amplitude {} exceeds room width {}; a moving target can leave the hotel",
                self.behaviors.move_amplitude,
                room_width
            );
        }
        Ok(())
    }

    /// Clamp the values the simulation would panic on (probabilities outside
    /// 0..=1, an empty room grid). Anything else invalid is only logged.
    pub fn sanitized(mut self) -> Self {
        if let Err(e) = self.validate() {
            log::warn!("Running with a repaired config: {e}");
        }
        self.trail_probability = clamp_probability(self.trail_probability);
        self.behaviors.shoot_probability = clamp_probability(self.behaviors.shoot_probability);
        self.building.floors = self.building.floors.max(1);
        self.building.columns = self.building.columns.max(1);
        self
    }

    /// Cap on live decorative particles
    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }
}

/// NaN counts as never
fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
        assert!(GameConfig::classic().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(
            r#"{ "gravity": 0.3, "wind_model": "random", "building": { "floors": 6 } }"#,
        )
        .unwrap();
        assert!((config.gravity - 0.3).abs() < 1e-6);
        assert_eq!(config.wind_model, WindModel::Random);
        assert_eq!(config.building.floors, 6);
        assert_eq!(config.building.columns, 5);
        assert_eq!(config.rehit_policy, RehitPolicy::AllowRehit);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = GameConfig::from_json(r#"{ "initial_attempts": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "initial_attempts",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = GameConfig::from_json("{ gravity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_keeps_policy() {
        let mut config = GameConfig::default();
        config.rehit_policy = RehitPolicy::BlockTarget;
        let json = config.to_json().unwrap();
        assert!(json.contains("block_target"));
        let back = GameConfig::from_json(&json).unwrap();
        assert_eq!(back.rehit_policy, RehitPolicy::BlockTarget);
    }

    #[test]
    fn test_sanitized_clamps_values_that_would_panic() {
        let mut config = GameConfig::default();
        config.trail_probability = 1.5;
        config.behaviors.shoot_probability = f64::NAN;
        config.building.columns = 0;
        assert!(config.validate().is_err());

        let config = config.sanitized();
        assert_eq!(config.trail_probability, 1.0);
        assert_eq!(config.behaviors.shoot_probability, 0.0);
        assert_eq!(config.building.columns, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(EffectsQuality::parse("MED"), Some(EffectsQuality::Medium));
        assert_eq!(EffectsQuality::parse("ultra"), None);
        assert!(EffectsQuality::Low.max_particles() < EffectsQuality::High.max_particles());
    }
}
