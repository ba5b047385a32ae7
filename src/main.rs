//! Bomba entry point
//!
//! Native builds run a headless demo: the autopilot plays seeded games
//! through the frame driver and the results are printed as JSON.
//!
//! Usage: `bomba [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use bomba::GameConfig;
    use bomba::consts::TICK_RATE_HZ;
    use bomba::highscores::format_game_time;
    use bomba::platform::{FrameDriver, LogDisplay, LogRenderer};
    use bomba::sim::{GameEvent, Session, TickInput};

    /// Ten minutes of game time
    const MAX_FRAMES: u32 = TICK_RATE_HZ * 60 * 10;
    const GAMES: u32 = 3;

    env_logger::init();
    log::info!("Bomba (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(&path).unwrap_or_else(|e| {
            log::error!("Could not load {path}: {e}; using defaults");
            GameConfig::default()
        }),
        None => GameConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xB0B_A);
    log::info!("Seed {seed}, quality {}", config.quality.as_str());

    let mut driver = FrameDriver::new(Session::new(config, seed));
    driver.set_display(Box::new(LogDisplay));
    driver.set_renderer(Box::new(LogRenderer::new(TICK_RATE_HZ as u64)));

    let autopilot = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let restart = TickInput {
        reset: true,
        ..autopilot.clone()
    };

    let mut games = 0;
    for _ in 0..MAX_FRAMES {
        let events = driver.frame(&autopilot);
        let over = events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { .. }));
        if over {
            games += 1;
            if games >= GAMES {
                break;
            }
            driver.frame(&restart);
        }
    }

    let session = &driver.session;
    log::info!(
        "Stopped after {} at level {} with {} points",
        format_game_time(session.time_ticks),
        session.level,
        session.score
    );

    let report = serde_json::json!({
        "seed": seed,
        "games_finished": games,
        "current": {
            "level": session.level,
            "score": session.score,
            "attempts": session.attempts,
            "phase": session.phase,
        },
        "high_scores": session.high_scores,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize report: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by the host page on the web; nothing to run here
}
