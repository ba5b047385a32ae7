//! Platform abstraction layer
//!
//! The simulation never draws or touches a UI. A host plugs in:
//! - a `Renderer` fed one `RenderSnapshot` per frame
//! - a `DisplaySink` for the level/score/attempts/message/wind readouts
//!
//! `FrameDriver` owns the session and runs the fixed-timestep loop between
//! them. Either collaborator may be missing; the simulation runs regardless.

mod log_sink;

pub use log_sink::{LogDisplay, LogRenderer};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::modulators::wind_arrows;
use crate::sim::{AttemptsTone, GameEvent, RenderSnapshot, Session, TickInput, tick};

/// Longest frame the driver will catch up on, in seconds
const MAX_FRAME_TIME: f32 = 0.1;

/// Draws a frame from a snapshot
pub trait Renderer {
    fn render(&mut self, snapshot: &RenderSnapshot);
}

/// Text readouts around the playfield
pub trait DisplaySink {
    fn set_level(&mut self, level: u32);
    fn set_score(&mut self, score: u64);
    fn set_attempts(&mut self, attempts: u32, tone: AttemptsTone);
    fn set_wind(&mut self, wind: f32, arrows: &str);
    fn show_message(&mut self, text: &str);
    fn clear_message(&mut self);
}

/// Fixed-timestep loop around a session
pub struct FrameDriver {
    pub session: Session,
    renderer: Option<Box<dyn Renderer>>,
    display: Option<Box<dyn DisplaySink>>,
    accumulator: f32,
    /// Input latched until the next tick runs
    input: TickInput,
}

impl FrameDriver {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            renderer: None,
            display: None,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderer = Some(renderer);
    }

    /// Attach a display and bring it up to date
    pub fn set_display(&mut self, display: Box<dyn DisplaySink>) {
        self.display = Some(display);
        self.sync_display();
    }

    /// Push every readout from current state
    pub fn sync_display(&mut self) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        let s = &self.session;
        display.set_level(s.level);
        display.set_score(s.score);
        display.set_attempts(s.attempts, s.attempts_tone());
        display.set_wind(s.wind, &wind_arrows(s.wind));
    }

    /// Run exactly one tick and render
    pub fn frame(&mut self, input: &TickInput) -> Vec<GameEvent> {
        self.latch(input);
        let events = self.step();
        self.render();
        events
    }

    /// Advance by wall-clock time: as many ticks as fit, capped per frame,
    /// then render once
    pub fn update(&mut self, elapsed_secs: f32, input: &TickInput) -> Vec<GameEvent> {
        self.latch(input);
        self.accumulator += elapsed_secs.clamp(0.0, MAX_FRAME_TIME);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.render();
        events
    }

    fn latch(&mut self, input: &TickInput) {
        if input.angle_degrees.is_some() {
            self.input.angle_degrees = input.angle_degrees;
        }
        if input.power_raw.is_some() {
            self.input.power_raw = input.power_raw;
        }
        self.input.fire |= input.fire;
        self.input.reset |= input.reset;
        self.input.autopilot = input.autopilot;
    }

    fn step(&mut self) -> Vec<GameEvent> {
        let events = tick(&mut self.session, &self.input);

        // Clear one-shot inputs after processing
        self.input.fire = false;
        self.input.reset = false;
        self.input.angle_degrees = None;
        self.input.power_raw = None;

        self.dispatch(&events);
        events
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        for event in events {
            match event {
                GameEvent::LevelChanged(level) => display.set_level(*level),
                GameEvent::ScoreChanged(score) => display.set_score(*score),
                GameEvent::AttemptsChanged(attempts) => {
                    display.set_attempts(*attempts, AttemptsTone::for_attempts(*attempts))
                }
                GameEvent::WindChanged(wind) => display.set_wind(*wind, &wind_arrows(*wind)),
                GameEvent::Message(text) => display.show_message(text),
                GameEvent::MessageCleared => display.clear_message(),
                _ => {}
            }
        }
    }

    fn render(&mut self) {
        if let Some(ref mut renderer) = self.renderer {
            renderer.render(&self.session.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::GamePhase;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        lines: Rc<RefCell<Vec<String>>>,
        frames: Rc<RefCell<u32>>,
    }

    impl DisplaySink for Recorder {
        fn set_level(&mut self, level: u32) {
            self.lines.borrow_mut().push(format!("level {level}"));
        }
        fn set_score(&mut self, score: u64) {
            self.lines.borrow_mut().push(format!("score {score}"));
        }
        fn set_attempts(&mut self, attempts: u32, tone: AttemptsTone) {
            self.lines
                .borrow_mut()
                .push(format!("attempts {attempts} {tone:?}"));
        }
        fn set_wind(&mut self, _wind: f32, arrows: &str) {
            self.lines.borrow_mut().push(format!("wind {arrows}"));
        }
        fn show_message(&mut self, text: &str) {
            self.lines.borrow_mut().push(format!("message {text}"));
        }
        fn clear_message(&mut self) {
            self.lines.borrow_mut().push("clear".to_string());
        }
    }

    impl Renderer for Recorder {
        fn render(&mut self, _snapshot: &RenderSnapshot) {
            *self.frames.borrow_mut() += 1;
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(Session::new(GameConfig::classic(), 4))
    }

    #[test]
    fn test_runs_without_collaborators() {
        let mut driver = driver();
        for _ in 0..10 {
            driver.frame(&TickInput::default());
        }
        assert_eq!(driver.session.time_ticks, 10);
    }

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut driver = driver();
        driver.update(0.05, &TickInput::default());
        let after_first = driver.session.time_ticks;
        assert!((2..=3).contains(&after_first), "{after_first}");

        // A stalled frame is capped
        driver.update(5.0, &TickInput::default());
        let ran = driver.session.time_ticks - after_first;
        assert!(ran <= MAX_SUBSTEPS as u64 && ran >= 5, "{ran}");
    }

    #[test]
    fn test_fire_survives_a_short_frame_and_fires_once() {
        let mut driver = driver();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        // Too short for a tick: the press is held over
        let events = driver.update(0.001, &fire);
        assert!(events.is_empty());

        let events = driver.update(0.05, &TickInput::default());
        let fired = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Fired { .. }))
            .count();
        assert_eq!(fired, 1);
        assert_eq!(driver.session.phase, GamePhase::InFlight);
    }

    #[test]
    fn test_display_and_renderer_receive_updates() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let frames = Rc::new(RefCell::new(0));
        let mut driver = driver();
        driver.set_display(Box::new(Recorder {
            lines: lines.clone(),
            frames: frames.clone(),
        }));
        driver.set_renderer(Box::new(Recorder {
            lines: lines.clone(),
            frames: frames.clone(),
        }));
        assert_eq!(lines.borrow()[0], "level 1");
        assert!(lines.borrow().contains(&"attempts 5 Normal".to_string()));

        driver.frame(&TickInput {
            reset: true,
            ..Default::default()
        });
        assert!(lines.borrow().contains(&"clear".to_string()));
        assert_eq!(*frames.borrow(), 1);
    }
}
