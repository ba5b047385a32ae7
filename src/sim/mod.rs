//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Deferred transitions go through the tick-keyed schedule
//! - No rendering or platform dependencies

pub mod building;
pub mod collision;
pub mod modulators;
pub mod particles;
pub mod physics;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use building::{Building, Rect};
pub use collision::{Outcome, resolve, resolve_with_obstacles};
pub use particles::{Particle, ParticleKind, ParticleSystem};
pub use physics::{Forces, Projectile, advance, launch_velocity, predict_path, solve_aim};
pub use schedule::{Schedule, ScheduledEvent};
pub use snapshot::{BuildingView, RenderSnapshot};
pub use state::{
    ActivePowerup, Aim, AttemptsTone, Combo, GameEvent, GamePhase, Obstacle, Powerup,
    PowerupKind, Session, Target, TargetBehavior,
};
pub use tick::{TickInput, fire, reset, tick};
