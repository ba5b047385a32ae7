//! Collision resolution against the hotel grid and obstacles
//!
//! Resolution is a pure function of a point and the current geometry. It
//! never marks damage; the caller applies the outcome.

use glam::Vec2;
use serde::Serialize;

use super::building::{Building, Rect};
use super::state::Target;
use crate::settings::RehitPolicy;

/// What a shell position resolves to this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Still flying (open air, hidden target, or a damaged room)
    None,
    /// The target's hit-box
    Hit { room: usize },
    /// An intact room other than the target
    Miss { room: usize },
    /// An obstacle, by index; always a miss
    Blocked { obstacle: usize },
}

impl Outcome {
    /// True for any outcome that ends the flight
    pub fn is_contact(&self) -> bool {
        !matches!(self, Outcome::None)
    }
}

/// Resolve a point against the hotel only
pub fn resolve(point: Vec2, building: &Building, target: &Target, policy: RehitPolicy) -> Outcome {
    // Cheap reject before any grid math
    if !building.bounds().contains(point) {
        return Outcome::None;
    }

    if target.visible && target.hitbox(building).contains(point) {
        if policy == RehitPolicy::BlockTarget && building.is_damaged(target.room) {
            return Outcome::None;
        }
        return Outcome::Hit { room: target.room };
    }

    let Some(room) = building.room_at(point) else {
        return Outcome::None;
    };
    // The target's own window with the target away or hidden is open air
    if room == target.room || building.is_damaged(room) {
        return Outcome::None;
    }
    Outcome::Miss { room }
}

/// Resolve against the hotel first, then obstacles in order
pub fn resolve_with_obstacles(
    point: Vec2,
    building: &Building,
    target: &Target,
    obstacles: &[Rect],
    policy: RehitPolicy,
) -> Outcome {
    match resolve(point, building, target, policy) {
        Outcome::None => obstacles
            .iter()
            .position(|o| o.contains(point))
            .map_or(Outcome::None, |obstacle| Outcome::Blocked { obstacle }),
        outcome => outcome,
    }
}

/// Circle pickup test for powerups and the cannon
#[inline]
pub fn within_radius(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}
