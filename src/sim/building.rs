//! Hotel geometry: a grid of rooms anchored in screen space
//!
//! Rooms are addressed by (floor, column) with floor 0 at the top, or by the
//! flat index `floor * columns + column`. Every room is a half-open rectangle
//! `[min, max)`, so the rooms partition the hotel with no overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::GameConfig;

/// Axis-aligned rectangle, half-open on the max side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// True if the two rectangles share any area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// The hotel under fire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    /// Top-left corner in screen space
    pub origin: Vec2,
    pub size: Vec2,
    pub floors: u32,
    pub columns: u32,
    damaged: Vec<bool>,
}

impl Building {
    pub fn new(origin: Vec2, size: Vec2, floors: u32, columns: u32) -> Self {
        Self {
            origin,
            size,
            floors,
            columns,
            damaged: vec![false; (floors * columns) as usize],
        }
    }

    /// Lay out the hotel for a level: shrunk on later levels when level
    /// scaling is on, always standing on the ground near the right edge.
    pub fn for_level(config: &GameConfig, level: u32) -> Self {
        let layout = &config.building;
        let mut size = Vec2::new(layout.width, layout.height);
        if config.level_scaling && level >= layout.shrink_level {
            size *= layout.shrink_factor;
        }
        let origin = Vec2::new(
            config.playfield.x - size.x - layout.right_margin,
            config.playfield.y - size.y - layout.ground_margin,
        );
        Self::new(origin, size, layout.floors, layout.columns)
    }

    #[inline]
    pub fn room_count(&self) -> usize {
        self.damaged.len()
    }

    pub fn room_size(&self) -> Vec2 {
        Vec2::new(
            self.size.x / self.columns as f32,
            self.size.y / self.floors as f32,
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin, self.size)
    }

    #[inline]
    pub fn room_index(&self, floor: u32, column: u32) -> usize {
        (floor * self.columns + column) as usize
    }

    /// (floor, column) for a flat index
    #[inline]
    pub fn room_coords(&self, room: usize) -> (u32, u32) {
        let room = room as u32;
        (room / self.columns, room % self.columns)
    }

    pub fn room_rect(&self, room: usize) -> Rect {
        let (floor, column) = self.room_coords(room);
        let room_size = self.room_size();
        let min = self.origin + Vec2::new(column as f32 * room_size.x, floor as f32 * room_size.y);
        Rect::new(min, room_size)
    }

    pub fn room_center(&self, room: usize) -> Vec2 {
        self.room_rect(room).center()
    }

    /// Room containing a point, if the point is inside the hotel
    pub fn room_at(&self, p: Vec2) -> Option<usize> {
        // Cheap reject before any division
        if !self.bounds().contains(p) {
            return None;
        }
        let room_size = self.room_size();
        let column = ((p.x - self.origin.x) / room_size.x).floor();
        let floor = ((p.y - self.origin.y) / room_size.y).floor();
        if column < 0.0 || floor < 0.0 {
            return None;
        }
        let (column, floor) = (column as u32, floor as u32);
        // Float rounding at the far edges can land one past the last cell
        if column >= self.columns || floor >= self.floors {
            return None;
        }
        Some(self.room_index(floor, column))
    }

    pub fn is_damaged(&self, room: usize) -> bool {
        self.damaged.get(room).copied().unwrap_or(false)
    }

    /// Mark a room damaged; returns true if it was intact before
    pub fn mark_damaged(&mut self, room: usize) -> bool {
        match self.damaged.get_mut(room) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear_damage(&mut self) {
        self.damaged.fill(false);
    }

    pub fn damage_map(&self) -> &[bool] {
        &self.damaged
    }

    pub fn damaged_count(&self) -> usize {
        self.damaged.iter().filter(|d| **d).count()
    }
}
