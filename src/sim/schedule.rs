//! Deferred transitions keyed by tick
//!
//! "Show the message, then advance" style delays are queued here and drained
//! at the start of the tick they fall due, before input is read.

use glam::Vec2;

/// A transition waiting for its tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledEvent {
    /// Leave `MissResolved` and allow firing again
    ResumeAiming,
    /// Leave `LevelUp` and start the level already counted
    AdvanceLevel,
    /// One firework burst at a point
    Firework { pos: Vec2 },
}

#[derive(Debug, Clone)]
struct Entry {
    due_tick: u64,
    seq: u64,
    event: ScheduledEvent,
}

/// Pending events, drained in (due tick, insertion) order
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for `due_tick`
    pub fn at(&mut self, due_tick: u64, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            due_tick,
            seq,
            event,
        });
    }

    /// Remove and return every event due at or before `now`
    pub fn drain_due(&mut self, now: u64) -> Vec<ScheduledEvent> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_tick <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.due_tick, e.seq));
        due.into_iter().map(|e| e.event).collect()
    }

    /// Drop everything still pending
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Cancelled {} scheduled events", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, event: &ScheduledEvent) -> bool {
        self.entries.iter().any(|e| &e.event == event)
    }
}
