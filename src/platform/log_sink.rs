//! Collaborators that write through the `log` facade
//!
//! Used by the headless binary; also handy when wiring a new frontend.

use super::{DisplaySink, Renderer};
use crate::sim::{AttemptsTone, GamePhase, RenderSnapshot};

/// Logs a one-line frame summary every `every` frames
pub struct LogRenderer {
    every: u64,
    frames: u64,
    last_phase: Option<GamePhase>,
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
            last_phase: None,
        }
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, snapshot: &RenderSnapshot) {
        self.frames += 1;
        if self.last_phase != Some(snapshot.phase) {
            log::debug!("Phase {:?} at tick {}", snapshot.phase, snapshot.tick);
            self.last_phase = Some(snapshot.phase);
        }
        if self.frames % self.every != 0 {
            return;
        }
        let damaged = snapshot.building.damaged.iter().filter(|d| **d).count();
        log::trace!(
            "tick {} level {} score {} shell {:?} particles {} damaged {}",
            snapshot.tick,
            snapshot.level,
            snapshot.score,
            snapshot.projectile.map(|p| p.pos),
            snapshot.particles.len(),
            damaged
        );
    }
}

/// Readouts as log lines
#[derive(Default)]
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn set_level(&mut self, level: u32) {
        log::info!("Level: {level}");
    }

    fn set_score(&mut self, score: u64) {
        log::info!("Score: {score}");
    }

    fn set_attempts(&mut self, attempts: u32, tone: AttemptsTone) {
        match tone {
            AttemptsTone::Critical => log::warn!("Attempts: {attempts}"),
            _ => log::info!("Attempts: {attempts}"),
        }
    }

    fn set_wind(&mut self, wind: f32, arrows: &str) {
        if wind == 0.0 {
            log::info!("Wind: calm");
        } else {
            log::info!("Wind: {arrows} ({wind:+.3})");
        }
    }

    fn show_message(&mut self, text: &str) {
        log::info!("[message] {text}");
    }

    fn clear_message(&mut self) {
        log::debug!("[message cleared]");
    }
}
