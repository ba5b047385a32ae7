//! Environmental and behavior modulators
//!
//! Wind, target behaviors, obstacles and powerups. These reshape the level
//! around the shot; none of them decides hits or misses.

use glam::Vec2;
use rand::Rng;

use super::building::{Building, Rect};
use super::physics::{Projectile, lob_velocity};
use super::state::{
    ActivePowerup, GameEvent, Obstacle, ObstacleMotion, Powerup, PowerupKind, Session, Target,
    TargetBehavior,
};
use crate::consts::ENEMY_PROJECTILE_RADIUS;
use crate::settings::{GameConfig, WindModel};

/// Wind amplitude for a level; zero before wind starts
pub fn wind_amplitude(config: &GameConfig, level: u32) -> f32 {
    if level < config.wind.start_level {
        return 0.0;
    }
    (level as f32 * config.wind.step).min(config.wind.cap)
}

/// Roll the wind for a level. The result lies within half the amplitude.
pub fn roll_wind<R: Rng + ?Sized>(
    config: &GameConfig,
    level: u32,
    time_secs: f32,
    rng: &mut R,
) -> f32 {
    let amplitude = wind_amplitude(config, level);
    if amplitude == 0.0 {
        return 0.0;
    }
    match config.wind_model {
        WindModel::Sinusoidal => time_secs.sin() * amplitude * 0.5,
        WindModel::Random => (rng.random::<f32>() - 0.5) * amplitude,
    }
}

/// Arrow string for the wind indicator, e.g. "→→"
pub fn wind_arrows(wind: f32) -> String {
    if wind == 0.0 {
        return String::new();
    }
    let arrow = if wind > 0.0 { '→' } else { '←' };
    let count = (wind.abs() * 10.0).ceil() as usize;
    std::iter::repeat_n(arrow, count).collect()
}

/// Behaviors unlocked on a level
pub fn unlocked_behaviors(config: &GameConfig, level: u32) -> Vec<TargetBehavior> {
    let mut unlocked = vec![TargetBehavior::Static];
    if !config.behaviors.enabled {
        return unlocked;
    }
    let b = &config.behaviors;
    if level >= b.moving_level {
        unlocked.push(TargetBehavior::Moving);
    }
    if level >= b.hiding_level {
        unlocked.push(TargetBehavior::Hiding);
    }
    if level >= b.shooting_level {
        unlocked.push(TargetBehavior::Shooting);
    }
    unlocked
}

/// Pick a target room and behavior for a fresh level
pub fn pick_target<R: Rng + ?Sized>(
    config: &GameConfig,
    level: u32,
    building: &Building,
    rng: &mut R,
) -> Target {
    let room = rng.random_range(0..building.room_count());
    let unlocked = unlocked_behaviors(config, level);
    let behavior = unlocked[rng.random_range(0..unlocked.len())];
    let mut target = Target::new(room, behavior);
    if behavior == TargetBehavior::Shooting {
        target.shoot_cooldown = config.behaviors.shoot_cooldown_ticks;
    }
    target
}

/// Obstacles standing on a level
pub fn obstacles_for_level(config: &GameConfig, level: u32) -> Vec<Obstacle> {
    let o = &config.obstacles;
    let mut obstacles = Vec::new();
    if level >= o.static_level {
        obstacles.push(Obstacle {
            rect: Rect::new(o.static_position, o.static_size),
            motion: ObstacleMotion::Static,
        });
    }
    if level >= o.moving_level {
        obstacles.push(Obstacle {
            rect: Rect::new(o.moving_position, o.moving_size),
            motion: ObstacleMotion::Vertical {
                speed: o.moving_speed,
                direction: 1.0,
                min_y: o.moving_margin,
                max_y: config.playfield.y - o.moving_margin,
            },
        });
    }
    obstacles
}

/// Slide moving obstacles one tick, reversing at their limits
pub fn update_obstacles(obstacles: &mut [Obstacle]) {
    for obstacle in obstacles {
        if let ObstacleMotion::Vertical {
            speed,
            ref mut direction,
            min_y,
            max_y,
        } = obstacle.motion
        {
            let dy = *direction * speed;
            obstacle.rect = obstacle.rect.translated(Vec2::new(0.0, dy));
            if obstacle.rect.min.y > max_y || obstacle.rect.min.y < min_y {
                *direction = -*direction;
            }
        }
    }
}

/// Update the target's offset and visibility for the current tick, and let
/// a shooting target fire. Returns the enemy shell fired, if any.
pub fn update_target(session: &mut Session) -> Option<Projectile> {
    let b = &session.config.behaviors;
    let t = session.time_secs();
    let target = &mut session.target;
    match target.behavior {
        TargetBehavior::Static => None,
        TargetBehavior::Moving => {
            target.offset = (t * b.move_frequency).sin() * b.move_amplitude;
            None
        }
        TargetBehavior::Hiding => {
            let interval = b.hide_interval_ticks.max(1);
            target.visible = (session.time_ticks / interval) % 2 == 0;
            None
        }
        TargetBehavior::Shooting => {
            if target.shoot_cooldown > 0 {
                target.shoot_cooldown -= 1;
                return None;
            }
            if !session.rng.random_bool(b.shoot_probability) {
                return None;
            }
            target.shoot_cooldown = b.shoot_cooldown_ticks;
            let from = target.center(&session.building);
            let jitter = (session.rng.random::<f32>() - 0.5) * 2.0 * b.enemy_spread;
            let aim_at = session.config.cannon_position + Vec2::new(jitter, 0.0);
            let vel = lob_velocity(from, aim_at, b.enemy_speed, session.config.gravity);
            let mut shell = Projectile::new(from, vel);
            shell.radius = ENEMY_PROJECTILE_RADIUS;
            Some(shell)
        }
    }
}

/// Count down the active effect and spawn new powerups when due
pub fn update_powerups(session: &mut Session, events: &mut Vec<GameEvent>) {
    if let Some(active) = session.active_powerup.as_mut() {
        active.remaining_ticks = active.remaining_ticks.saturating_sub(1);
        if active.remaining_ticks == 0 {
            let kind = active.kind;
            session.active_powerup = None;
            log::debug!("{} wore off", kind.as_str());
            events.push(GameEvent::PowerupExpired(kind));
        }
    }

    let cfg = &session.config.powerups;
    if !cfg.enabled || session.level < cfg.start_level {
        return;
    }
    if session.powerup_timer > 0 {
        session.powerup_timer -= 1;
        return;
    }
    session.powerup_timer = cfg.spawn_interval_ticks;
    if session.powerups.len() >= cfg.max_concurrent {
        return;
    }

    let (min, max, radius) = (cfg.spawn_min, cfg.spawn_max, cfg.radius);
    let kind = PowerupKind::ALL[session.rng.random_range(0..PowerupKind::ALL.len())];
    let pos = Vec2::new(
        min.x + session.rng.random::<f32>() * (max.x - min.x),
        min.y + session.rng.random::<f32>() * (max.y - min.y),
    );
    let id = session.next_entity_id();
    session.powerups.push(Powerup {
        id,
        kind,
        pos,
        radius,
    });
    log::debug!("Spawned {} at ({:.0}, {:.0})", kind.as_str(), pos.x, pos.y);
    events.push(GameEvent::PowerupSpawned(kind));
}

/// Collect any powerup the shell passes through. A new effect replaces the
/// active one.
pub fn collect_powerups(session: &mut Session, shell_pos: Vec2, events: &mut Vec<GameEvent>) {
    let effect_ticks = session.config.powerups.effect_ticks;
    let mut collected = Vec::new();
    session.powerups.retain(|p| {
        if p.pos.distance(shell_pos) <= p.radius {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        log::info!("Collected {}", kind.as_str());
        session.active_powerup = Some(ActivePowerup {
            kind,
            remaining_ticks: effect_ticks,
        });
        events.push(GameEvent::PowerupCollected(kind));
    }
}

/// Physics multiplier from slow-time
pub fn time_scale(session: &Session) -> f32 {
    if session.active(PowerupKind::SlowTime) {
        session.config.powerups.slow_factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_wind_calm_before_start_level() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(roll_wind(&config, 1, 3.0, &mut rng), 0.0);
        assert_eq!(wind_amplitude(&config, 1), 0.0);
    }

    #[test]
    fn test_wind_amplitude_grows_then_caps() {
        let config = GameConfig::default();
        let a2 = wind_amplitude(&config, 2);
        let a3 = wind_amplitude(&config, 3);
        assert!(a3 > a2);
        assert_eq!(wind_amplitude(&config, 40), config.wind.cap);
    }

    #[test]
    fn test_wind_models_stay_bounded() {
        let mut rng = Pcg32::seed_from_u64(9);
        for model in [WindModel::Sinusoidal, WindModel::Random] {
            let mut config = GameConfig::default();
            config.wind_model = model;
            for level in 2..30 {
                let bound = wind_amplitude(&config, level) * 0.5;
                let wind = roll_wind(&config, level, level as f32 * 0.7, &mut rng);
                assert!(wind.abs() <= bound + 1e-6, "{model:?} level {level}: {wind}");
            }
        }
    }

    #[test]
    fn test_wind_arrows() {
        assert_eq!(wind_arrows(0.0), "");
        assert_eq!(wind_arrows(0.15), "→→");
        assert_eq!(wind_arrows(-0.05), "←");
    }

    #[test]
    fn test_behaviors_unlock_by_level() {
        let config = GameConfig::default();
        assert_eq!(unlocked_behaviors(&config, 1), vec![TargetBehavior::Static]);
        assert_eq!(unlocked_behaviors(&config, 7).len(), 4);
        assert_eq!(unlocked_behaviors(&GameConfig::classic(), 7).len(), 1);
    }

    #[test]
    fn test_obstacles_gate_and_bounce() {
        let config = GameConfig::default();
        assert!(obstacles_for_level(&config, 4).is_empty());
        assert_eq!(obstacles_for_level(&config, 5).len(), 1);
        let mut obstacles = obstacles_for_level(&config, 6);
        assert_eq!(obstacles.len(), 2);

        let start_y = obstacles[1].rect.min.y;
        update_obstacles(&mut obstacles);
        assert_eq!(obstacles[0].rect.min.y, 200.0);
        assert_eq!(obstacles[1].rect.min.y, start_y + 2.0);

        // Runs down to the lower limit, then comes back up
        let mut lowest = start_y;
        for _ in 0..400 {
            update_obstacles(&mut obstacles);
            lowest = lowest.max(obstacles[1].rect.min.y);
        }
        assert!(lowest <= config.playfield.y - config.obstacles.moving_margin + 2.0 * 2.0);
        assert!(obstacles[1].rect.min.y >= config.obstacles.moving_margin - 4.0);
    }

    #[test]
    fn test_pick_target_uniform_range() {
        let config = GameConfig::default();
        let building = Building::for_level(&config, 1);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut seen = vec![false; building.room_count()];
        for _ in 0..500 {
            let target = pick_target(&config, 1, &building, &mut rng);
            assert_eq!(target.behavior, TargetBehavior::Static);
            seen[target.room] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_powerups_cap_at_two() {
        let mut config = GameConfig::default();
        config.powerups.spawn_interval_ticks = 0;
        let mut session = Session::new(config, 5);
        session.level = 2;
        let mut events = Vec::new();
        for _ in 0..10 {
            update_powerups(&mut session, &mut events);
        }
        assert_eq!(session.powerups.len(), 2);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PowerupSpawned(_)))
                .count(),
            2
        );
    }

    #[test]
    fn test_collect_replaces_active_effect() {
        let mut session = Session::new(GameConfig::default(), 5);
        session.active_powerup = Some(ActivePowerup {
            kind: PowerupKind::SlowTime,
            remaining_ticks: 3,
        });
        session.powerups.push(Powerup {
            id: 99,
            kind: PowerupKind::Shield,
            pos: Vec2::new(200.0, 200.0),
            radius: 15.0,
        });
        let mut events = Vec::new();
        collect_powerups(&mut session, Vec2::new(205.0, 195.0), &mut events);
        assert!(session.powerups.is_empty());
        assert!(session.active(PowerupKind::Shield));
        assert_eq!(events, vec![GameEvent::PowerupCollected(PowerupKind::Shield)]);
        assert_eq!(time_scale(&session), 1.0);
    }

    #[test]
    fn test_effect_expires() {
        let mut session = Session::new(GameConfig::classic(), 5);
        session.active_powerup = Some(ActivePowerup {
            kind: PowerupKind::SlowTime,
            remaining_ticks: 2,
        });
        assert_eq!(time_scale(&session), 0.5);
        let mut events = Vec::new();
        update_powerups(&mut session, &mut events);
        update_powerups(&mut session, &mut events);
        assert!(session.active_powerup.is_none());
        assert_eq!(events, vec![GameEvent::PowerupExpired(PowerupKind::SlowTime)]);
    }

    #[test]
    fn test_shooting_target_fires_toward_cannon() {
        let mut config = GameConfig::default();
        config.behaviors.shoot_probability = 1.0;
        config.behaviors.shoot_cooldown_ticks = 2;
        let mut session = Session::new(config, 11);
        session.target = Target::new(0, TargetBehavior::Shooting);
        session.target.shoot_cooldown = 2;

        assert!(update_target(&mut session).is_none());
        assert!(update_target(&mut session).is_none());
        let shell = update_target(&mut session).expect("cooldown elapsed");
        assert!(shell.vel.x < 0.0, "cannon is to the left");
        assert_eq!(session.target.shoot_cooldown, 2);
    }

    #[test]
    fn test_hiding_target_toggles() {
        let mut session = Session::new(GameConfig::default(), 11);
        session.target = Target::new(3, TargetBehavior::Hiding);
        let interval = session.config.behaviors.hide_interval_ticks;
        session.time_ticks = 0;
        update_target(&mut session);
        assert!(session.target.visible);
        session.time_ticks = interval;
        update_target(&mut session);
        assert!(!session.target.visible);
        session.time_ticks = interval * 2;
        update_target(&mut session);
        assert!(session.target.visible);
    }
}
