//! Session state and core simulation types
//!
//! One `Session` owns everything a running game needs. It is passed by
//! reference to every operation; nothing lives in globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::building::{Building, Rect};
use super::particles::ParticleSystem;
use super::physics::Projectile;
use super::schedule::Schedule;
use crate::highscores::HighScores;
use crate::settings::GameConfig;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Cannon ready, no shell in flight
    Aiming,
    /// Primary shell in the air
    InFlight,
    /// Shell missed; waiting out the miss delay
    MissResolved,
    /// Target hit; victory message showing until the next level starts
    LevelUp,
    /// Out of attempts. Only an explicit reset leaves this phase.
    GameOver,
}

/// Slider values for the cannon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aim {
    /// 0 (flat right) to 180 (flat left)
    pub angle_degrees: f32,
    pub power_raw: f32,
}

impl Default for Aim {
    fn default() -> Self {
        Self {
            angle_degrees: 45.0,
            power_raw: 50.0,
        }
    }
}

/// How the target room behaves this level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetBehavior {
    Static,
    /// Sways left and right inside its window
    Moving,
    /// Ducks out of sight on a fixed interval
    Hiding,
    /// Fires back at the cannon
    Shooting,
}

/// The room to hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub room: usize,
    pub behavior: TargetBehavior,
    /// Horizontal displacement of the hit-box (moving targets)
    pub offset: f32,
    /// Hidden targets cannot be hit
    pub visible: bool,
    /// Ticks until a shooting target may fire again
    pub shoot_cooldown: u32,
}

impl Target {
    pub fn new(room: usize, behavior: TargetBehavior) -> Self {
        Self {
            room,
            behavior,
            offset: 0.0,
            visible: true,
            shoot_cooldown: 0,
        }
    }

    /// Effective hit-box: the room rectangle shifted by the current offset
    pub fn hitbox(&self, building: &Building) -> Rect {
        building
            .room_rect(self.room)
            .translated(Vec2::new(self.offset, 0.0))
    }

    pub fn center(&self, building: &Building) -> Vec2 {
        self.hitbox(building).center()
    }
}

/// Motion of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleMotion {
    Static,
    /// Bounces vertically between `min_y` and `max_y` (top edge)
    Vertical {
        speed: f32,
        direction: f32,
        min_y: f32,
        max_y: f32,
    },
}

/// A wall between the cannon and the hotel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
    pub motion: ObstacleMotion,
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Physics runs at half speed
    SlowTime,
    /// Next fire launches three shells
    MultiShot,
    /// Next penalty is cancelled
    Shield,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::SlowTime,
        PowerupKind::MultiShot,
        PowerupKind::Shield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::SlowTime => "Slow Time",
            PowerupKind::MultiShot => "Multi-Shot",
            PowerupKind::Shield => "Shield",
        }
    }
}

/// A collectible floating in the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// The one effect currently in force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    pub remaining_ticks: u32,
}

/// Consecutive hits and the window left to extend them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    /// Ticks left before the combo lapses
    pub timer: u32,
}

impl Combo {
    /// Score multiplier for the next hit
    pub fn multiplier(&self) -> u32 {
        self.count.max(1)
    }

    pub fn register_hit(&mut self, window: u32) {
        self.count += 1;
        self.timer = window;
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.timer = 0;
    }

    /// Count down; returns true on the tick the combo lapses
    pub fn tick(&mut self) -> bool {
        if self.timer == 0 {
            return false;
        }
        self.timer -= 1;
        if self.timer == 0 && self.count > 0 {
            self.count = 0;
            return true;
        }
        false
    }
}

/// Color hint for the attempts display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptsTone {
    Normal,
    Warning,
    Critical,
}

impl AttemptsTone {
    pub fn for_attempts(attempts: u32) -> Self {
        match attempts {
            0..=2 => AttemptsTone::Critical,
            3 => AttemptsTone::Warning,
            _ => AttemptsTone::Normal,
        }
    }
}

/// Everything a tick can report to the outside
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelChanged(u32),
    ScoreChanged(u64),
    AttemptsChanged(u32),
    WindChanged(f32),
    /// Show a message box
    Message(String),
    /// Hide the message box
    MessageCleared,
    LevelStarted {
        level: u32,
        target_room: usize,
        behavior: TargetBehavior,
    },
    Fired {
        velocity: Vec2,
        companions: u32,
    },
    Hit {
        room: usize,
        points: u64,
    },
    /// Shell missed; `room` is the room it damaged, if any
    Missed {
        room: Option<usize>,
    },
    Blocked {
        obstacle: usize,
    },
    ShieldAbsorbed,
    ComboLapsed,
    PowerupSpawned(PowerupKind),
    PowerupCollected(PowerupKind),
    PowerupExpired(PowerupKind),
    EnemyFired,
    EnemyHit,
    SubProjectileBonus {
        room: usize,
        points: u64,
    },
    GameOver {
        score: u64,
        level: u32,
    },
    Reset,
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct Session {
    pub config: GameConfig,
    /// Seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    /// Attempts left on this level
    pub attempts: u32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Slider state
    pub aim: Aim,
    /// The player's shell, present only in `InFlight`
    pub projectile: Option<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub building: Building,
    pub target: Target,
    pub obstacles: Vec<Obstacle>,
    /// Horizontal acceleration this level
    pub wind: f32,
    pub combo: Combo,
    pub powerups: Vec<Powerup>,
    pub active_powerup: Option<ActivePowerup>,
    /// Ticks until the next powerup spawn attempt
    pub powerup_timer: u32,
    pub particles: ParticleSystem,
    pub schedule: Schedule,
    pub high_scores: HighScores,
    next_id: u32,
}

impl Session {
    /// Create a session at level 1 with the given seed. Config values the
    /// simulation cannot run with are clamped first.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let building = Building::for_level(&config, 1);
        let particles = ParticleSystem::new(config.max_particles());
        let mut session = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            score: 0,
            attempts: config.initial_attempts,
            phase: GamePhase::Aiming,
            time_ticks: 0,
            aim: Aim::default(),
            projectile: None,
            enemy_projectiles: Vec::new(),
            building,
            target: Target::new(0, TargetBehavior::Static),
            obstacles: Vec::new(),
            wind: 0.0,
            combo: Combo::default(),
            powerups: Vec::new(),
            active_powerup: None,
            powerup_timer: config.powerups.spawn_interval_ticks,
            particles,
            schedule: Schedule::new(),
            high_scores: HighScores::new(),
            next_id: 1,
            config,
        };
        // Events from the opening level are not reported; the first tick's
        // caller reads initial values from the snapshot.
        let mut events = Vec::new();
        super::tick::start_level(&mut session, &mut events);
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Firing is allowed only while aiming
    pub fn can_fire(&self) -> bool {
        self.phase == GamePhase::Aiming
    }

    pub fn in_flight(&self) -> bool {
        self.phase == GamePhase::InFlight
    }

    /// Score for a plain hit on `level`
    pub fn base_points(&self, level: u32) -> u64 {
        self.config.base_points * level as u64
    }

    pub fn active(&self, kind: PowerupKind) -> bool {
        self.active_powerup.is_some_and(|p| p.kind == kind)
    }

    pub fn attempts_tone(&self) -> AttemptsTone {
        AttemptsTone::for_attempts(self.attempts)
    }

    /// Session time in seconds
    pub fn time_secs(&self) -> f32 {
        self.time_ticks as f32 * crate::consts::SIM_DT
    }

    /// Obstacle rectangles in resolver order
    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.obstacles.iter().map(|o| o.rect).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_aiming_at_level_one() {
        let session = Session::new(GameConfig::default(), 42);
        assert_eq!(session.level, 1);
        assert_eq!(session.score, 0);
        assert_eq!(session.attempts, 5);
        assert!(session.can_fire());
        assert!(!session.in_flight());
        assert!(session.target.room < session.building.room_count());
        // Level 1 is calm
        assert_eq!(session.wind, 0.0);
    }

    #[test]
    fn test_out_of_range_config_is_clamped_on_new() {
        use crate::sim::tick::{TickInput, fire, tick};

        let mut config = GameConfig::default();
        config.trail_probability = 2.0;
        config.building.floors = 0;
        let mut session = Session::new(config, 42);
        assert_eq!(session.building.room_count(), session.config.building.columns as usize);
        assert_eq!(session.config.trail_probability, 1.0);

        assert!(!fire(&mut session, 45.0, 50.0).is_empty());
        for _ in 0..20 {
            tick(&mut session, &TickInput::default());
        }
        assert_eq!(session.time_ticks, 20);
    }

    #[test]
    fn test_combo_lapses_after_window() {
        let mut combo = Combo::default();
        assert_eq!(combo.multiplier(), 1);
        combo.register_hit(3);
        combo.register_hit(3);
        assert_eq!(combo.multiplier(), 2);
        assert!(!combo.tick());
        assert!(!combo.tick());
        assert!(combo.tick());
        assert_eq!(combo.count, 0);
        assert!(!combo.tick());
    }

    #[test]
    fn test_attempts_tone_thresholds() {
        assert_eq!(AttemptsTone::for_attempts(5), AttemptsTone::Normal);
        assert_eq!(AttemptsTone::for_attempts(4), AttemptsTone::Normal);
        assert_eq!(AttemptsTone::for_attempts(3), AttemptsTone::Warning);
        assert_eq!(AttemptsTone::for_attempts(2), AttemptsTone::Critical);
        assert_eq!(AttemptsTone::for_attempts(0), AttemptsTone::Critical);
    }

    #[test]
    fn test_target_hitbox_follows_offset() {
        let building = Building::new(Vec2::new(450.0, 180.0), Vec2::new(300.0, 400.0), 4, 5);
        let mut target = Target::new(7, TargetBehavior::Moving);
        assert_eq!(target.hitbox(&building), building.room_rect(7));
        target.offset = 10.0;
        assert_eq!(target.hitbox(&building).min.x, building.room_rect(7).min.x + 10.0);
    }
}
