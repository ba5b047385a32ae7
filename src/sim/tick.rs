//! Fixed timestep simulation tick
//!
//! One call advances the session by one step in a fixed order: due scheduled
//! events, input, modulators, physics, collision, then particles and score.

use glam::Vec2;
use rand::Rng;

use super::building::Building;
use super::collision::{Outcome, resolve_with_obstacles, within_radius};
use super::modulators;
use super::particles::{ParticleWorld, colors};
use super::physics::{self, Forces};
use super::schedule::ScheduledEvent;
use super::state::{Aim, GameEvent, GamePhase, PowerupKind, Session};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Angle slider, degrees (0 = flat right, 180 = flat left)
    pub angle_degrees: Option<f32>,
    /// Power slider, raw units before the divisor
    pub power_raw: Option<f32>,
    /// Fire with the current slider values
    pub fire: bool,
    /// Start over from level 1
    pub reset: bool,
    /// Demo mode - the session aims and fires by itself
    pub autopilot: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    session.time_ticks += 1;

    for scheduled in session.schedule.drain_due(session.time_ticks) {
        apply_scheduled(session, scheduled, &mut events);
    }

    if input.reset {
        events.extend(reset(session));
        return events;
    }

    if let Some(angle) = input.angle_degrees {
        session.aim.angle_degrees = angle.clamp(0.0, 180.0);
    }
    if let Some(power) = input.power_raw {
        session.aim.power_raw = power.clamp(0.0, session.config.max_power_raw);
    }

    let mut fire_now = input.fire;
    if input.autopilot && session.can_fire() {
        if let Some(aim) = autopilot_aim(session) {
            session.aim = aim;
        }
        fire_now = true;
    }
    if fire_now {
        let aim = session.aim;
        events.extend(fire(session, aim.angle_degrees, aim.power_raw));
    }

    if session.phase != GamePhase::GameOver {
        update_modulators(session, &mut events);
        update_projectiles(session, &mut events);
    }

    update_particles(session, &mut events);
    events
}

/// Launch a shell from the cannon. Ignored (no state change, no events)
/// unless the session is aiming.
pub fn fire(session: &mut Session, angle_degrees: f32, power_raw: f32) -> Vec<GameEvent> {
    if !session.can_fire() {
        log::debug!("Fire ignored during {:?}", session.phase);
        return Vec::new();
    }

    let angle_degrees = angle_degrees.clamp(0.0, 180.0);
    let power_raw = power_raw.clamp(0.0, session.config.max_power_raw);
    session.aim = Aim {
        angle_degrees,
        power_raw,
    };

    let origin = session.config.cannon_position;
    let velocity = physics::launch_velocity(angle_degrees, power_raw, &session.config);
    session.projectile = Some(physics::Projectile::new(origin, velocity));
    session.phase = GamePhase::InFlight;

    let mut companions = 0;
    if session.active(PowerupKind::MultiShot) {
        session.active_powerup = None;
        let spread = session.config.powerups.multishot_spread_degrees;
        let life = session.config.powerups.sub_projectile_lifetime;
        for side in [-1.0, 1.0] {
            let vel = physics::launch_velocity(
                angle_degrees + side * spread,
                power_raw,
                &session.config,
            );
            if session.particles.sub_projectile(origin, vel, life).is_some() {
                companions += 1;
            }
        }
    }

    log::debug!(
        "Fired at {:.0} degrees, power {:.0} (+{} companions)",
        angle_degrees,
        power_raw,
        companions
    );
    vec![GameEvent::Fired {
        velocity,
        companions,
    }]
}

/// Start over at level 1. Accepted from any phase.
pub fn reset(session: &mut Session) -> Vec<GameEvent> {
    let mut events = vec![GameEvent::Reset];
    session.schedule.clear();
    session.level = 1;
    session.score = 0;
    session.combo.reset();
    session.powerups.clear();
    session.active_powerup = None;
    session.powerup_timer = session.config.powerups.spawn_interval_ticks;
    session.particles.clear();
    start_level(session, &mut events);
    events.push(GameEvent::LevelChanged(1));
    events.push(GameEvent::ScoreChanged(0));
    events.push(GameEvent::MessageCleared);
    log::info!("Session reset");
    events
}

/// Lay out the current level: hotel, target, obstacles, wind and a full set
/// of attempts.
pub(crate) fn start_level(session: &mut Session, events: &mut Vec<GameEvent>) {
    let level = session.level;
    let t = session.time_secs();
    session.building = Building::for_level(&session.config, level);
    session.target =
        modulators::pick_target(&session.config, level, &session.building, &mut session.rng);
    session.obstacles = modulators::obstacles_for_level(&session.config, level);
    session.wind = modulators::roll_wind(&session.config, level, t, &mut session.rng);
    session.attempts = session.config.initial_attempts;
    session.projectile = None;
    session.enemy_projectiles.clear();
    session.phase = GamePhase::Aiming;

    log::info!(
        "Level {}: target room {} ({:?}), wind {:.3}",
        level,
        session.target.room,
        session.target.behavior,
        session.wind
    );
    events.push(GameEvent::LevelStarted {
        level,
        target_room: session.target.room,
        behavior: session.target.behavior,
    });
    events.push(GameEvent::AttemptsChanged(session.attempts));
    events.push(GameEvent::WindChanged(session.wind));
}

fn apply_scheduled(session: &mut Session, event: ScheduledEvent, events: &mut Vec<GameEvent>) {
    match event {
        ScheduledEvent::ResumeAiming => {
            if session.phase == GamePhase::MissResolved {
                session.phase = GamePhase::Aiming;
                events.push(GameEvent::MessageCleared);
            }
        }
        ScheduledEvent::AdvanceLevel => {
            if session.phase == GamePhase::LevelUp {
                start_level(session, events);
                events.push(GameEvent::MessageCleared);
            }
        }
        ScheduledEvent::Firework { pos } => {
            session.particles.firework(&mut session.rng, pos);
        }
    }
}

fn current_forces(session: &Session) -> Forces {
    Forces {
        gravity: session.config.gravity,
        wind: session.wind,
        time_scale: modulators::time_scale(session),
    }
}

/// Slider values for the autopilot: straight at the target if a clear path
/// exists, otherwise at the nearest intact room to open one.
fn autopilot_aim(session: &Session) -> Option<Aim> {
    let forces = current_forces(session);
    let obstacles = session.obstacle_rects();
    let building = &session.building;
    let target = session.target.room;

    if let Some(aim) = physics::solve_aim(&session.config, &forces, building, &obstacles, target) {
        return Some(aim);
    }

    let goal = building.room_center(target);
    let mut candidates: Vec<usize> = (0..building.room_count())
        .filter(|&room| room != target && !building.is_damaged(room))
        .collect();
    candidates.sort_by(|a, b| {
        let da = building.room_center(*a).distance_squared(goal);
        let db = building.room_center(*b).distance_squared(goal);
        da.total_cmp(&db)
    });
    candidates
        .into_iter()
        .find_map(|room| physics::solve_aim(&session.config, &forces, building, &obstacles, room))
}

fn update_modulators(session: &mut Session, events: &mut Vec<GameEvent>) {
    modulators::update_obstacles(&mut session.obstacles);

    if let Some(shell) = modulators::update_target(session) {
        if session.phase != GamePhase::LevelUp {
            session.enemy_projectiles.push(shell);
            events.push(GameEvent::EnemyFired);
        }
    }

    modulators::update_powerups(session, events);

    if session.combo.tick() {
        log::debug!("Combo lapsed");
        events.push(GameEvent::ComboLapsed);
    }
}

fn update_projectiles(session: &mut Session, events: &mut Vec<GameEvent>) {
    let forces = current_forces(session);

    // Enemy shells fall under gravity only
    let enemy_forces = Forces { wind: 0.0, ..forces };
    let cannon = session.config.cannon_position;
    let playfield = session.config.playfield;
    let mut cannon_hits = 0;
    session.enemy_projectiles.retain_mut(|shell| {
        physics::advance(shell, &enemy_forces);
        if within_radius(shell.pos, cannon, CANNON_HIT_RADIUS) {
            cannon_hits += 1;
            return false;
        }
        !physics::out_of_bounds(shell.pos, playfield)
    });
    for _ in 0..cannon_hits {
        on_enemy_hit(session, events);
    }

    let Some(shell) = session.projectile.as_mut() else {
        return;
    };
    physics::advance(shell, &forces);
    let pos = shell.pos;

    if session.rng.random_bool(session.config.trail_probability) {
        session.particles.trail(pos);
    }

    modulators::collect_powerups(session, pos, events);

    let obstacles = session.obstacle_rects();
    let outcome = resolve_with_obstacles(
        pos,
        &session.building,
        &session.target,
        &obstacles,
        session.config.rehit_policy,
    );
    match outcome {
        Outcome::Hit { room } => on_hit(session, room, pos, events),
        Outcome::Miss { room } => {
            session.building.mark_damaged(room);
            session
                .particles
                .burst(&mut session.rng, pos, IMPACT_SPARKS, colors::IMPACT);
            log::debug!("Shell hit room {room}");
            on_miss(session, Some(room), events);
        }
        Outcome::Blocked { obstacle } => {
            session
                .particles
                .burst(&mut session.rng, pos, MISS_SPARKS, colors::IMPACT);
            log::debug!("Shell stopped by obstacle {obstacle}");
            events.push(GameEvent::Blocked { obstacle });
            on_miss(session, None, events);
        }
        Outcome::None => {
            if physics::out_of_bounds(pos, session.config.playfield) {
                session
                    .particles
                    .burst(&mut session.rng, pos, MISS_SPARKS, colors::IMPACT);
                on_miss(session, None, events);
            }
        }
    }
}

fn on_hit(session: &mut Session, room: usize, pos: Vec2, events: &mut Vec<GameEvent>) {
    session.projectile = None;
    let points = session.base_points(session.level) * u64::from(session.combo.multiplier());
    session.score += points;
    session.combo.register_hit(session.config.timing.combo_window_ticks);
    session.level += 1;
    session.building.mark_damaged(room);
    session.phase = GamePhase::LevelUp;
    // Attempts refill at the hit; enemy shells in the air are dropped
    session.attempts = session.config.initial_attempts;
    session.enemy_projectiles.clear();

    session
        .particles
        .burst(&mut session.rng, pos, IMPACT_SPARKS, colors::IMPACT);
    session
        .particles
        .floating_text(pos, format!("+{points}"), colors::SCORE_TEXT);

    let center = session.target.center(&session.building);
    let now = session.time_ticks;
    let interval = session.config.timing.firework_interval_ticks;
    session.particles.firework(&mut session.rng, center);
    for i in 1..FIREWORK_BURSTS {
        session
            .schedule
            .at(now + i as u64 * interval, ScheduledEvent::Firework { pos: center });
    }
    session.schedule.at(
        now + session.config.timing.hit_delay_ticks,
        ScheduledEvent::AdvanceLevel,
    );

    log::info!(
        "Hit room {} for {} points (combo x{}); on to level {}",
        room,
        points,
        session.combo.count,
        session.level
    );
    events.push(GameEvent::Hit { room, points });
    events.push(GameEvent::ScoreChanged(session.score));
    events.push(GameEvent::LevelChanged(session.level));
    events.push(GameEvent::AttemptsChanged(session.attempts));
    events.push(GameEvent::Message("Hooray! Target Hit!".to_string()));
}

fn on_miss(session: &mut Session, room: Option<usize>, events: &mut Vec<GameEvent>) {
    session.projectile = None;
    events.push(GameEvent::Missed { room });
    if apply_penalty(session, events) {
        return;
    }
    session.phase = GamePhase::MissResolved;
    events.push(GameEvent::Message(format!(
        "Missed! {} attempts left",
        session.attempts
    )));
    session.schedule.at(
        session.time_ticks + session.config.timing.miss_delay_ticks,
        ScheduledEvent::ResumeAiming,
    );
}

fn on_enemy_hit(session: &mut Session, events: &mut Vec<GameEvent>) {
    if matches!(session.phase, GamePhase::GameOver | GamePhase::LevelUp) {
        return;
    }
    let cannon = session.config.cannon_position;
    session
        .particles
        .burst(&mut session.rng, cannon, MISS_SPARKS, colors::ENEMY_IMPACT);
    log::info!("Cannon hit by enemy fire");
    events.push(GameEvent::EnemyHit);
    apply_penalty(session, events);
}

/// Cost one attempt unless a shield soaks it up. Returns true if this ended
/// the game.
fn apply_penalty(session: &mut Session, events: &mut Vec<GameEvent>) -> bool {
    if session.active(PowerupKind::Shield) {
        session.active_powerup = None;
        log::info!("Shield absorbed the penalty");
        events.push(GameEvent::ShieldAbsorbed);
        return false;
    }

    session.attempts = session.attempts.saturating_sub(1);
    session.combo.reset();
    events.push(GameEvent::AttemptsChanged(session.attempts));
    if session.attempts == 0 {
        enter_game_over(session, events);
        return true;
    }
    false
}

fn enter_game_over(session: &mut Session, events: &mut Vec<GameEvent>) {
    session.phase = GamePhase::GameOver;
    session.schedule.clear();
    session.projectile = None;
    session.enemy_projectiles.clear();
    session.combo.reset();
    let rank = session
        .high_scores
        .add_score(session.score, session.level, session.time_ticks);
    log::info!(
        "Game over at level {} with {} points (rank {:?})",
        session.level,
        session.score,
        rank
    );
    events.push(GameEvent::GameOver {
        score: session.score,
        level: session.level,
    });
    events.push(GameEvent::Message("Game Over! Try again?".to_string()));
}

fn update_particles(session: &mut Session, events: &mut Vec<GameEvent>) {
    let forces = current_forces(session);
    let world = ParticleWorld {
        building: &session.building,
        target: &session.target,
        bounds: session.config.playfield,
        forces,
        policy: session.config.rehit_policy,
    };
    let impacts = session.particles.tick(&world);
    if session.phase == GamePhase::GameOver {
        return;
    }

    let bonus = session.config.powerups.sub_projectile_bonus;
    for impact in impacts {
        session.score += bonus;
        session
            .particles
            .floating_text(impact.pos, format!("+{bonus}"), colors::BONUS_TEXT);
        log::debug!("Companion shell struck room {} for {}", impact.room, bonus);
        events.push(GameEvent::SubProjectileBonus {
            room: impact.room,
            points: bonus,
        });
        events.push(GameEvent::ScoreChanged(session.score));
    }
}
